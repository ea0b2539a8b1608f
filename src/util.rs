/// Return early with an error, optionally built from a format string.
///
/// ```ignore
/// raise!(CalcError::Syntax, "'{}' expected", ")");
/// ```
#[macro_export]
macro_rules! raise {
    ($x:expr) => {
        return ::std::result::Result::Err(::std::convert::From::from($x))
    };
    ($x:path, $msg:expr) => {
        {
            let msg: ::std::string::String = $msg.into();
            $crate::raise!($x(msg));
        }
    };
    ($x:path, $format:expr, $( $arg:expr ),* ) => {
        $crate::raise!($x, format!($format, $($arg),*))
    };
}
