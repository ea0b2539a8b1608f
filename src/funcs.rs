use rand::Rng;
use std::collections::HashMap;
use std::fmt;

pub type UnaryFn = Box<dyn Fn(f64) -> f64>;
pub type BinaryFn = Box<dyn Fn(f64, f64) -> f64>;

/// Which arity a function name resolved to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Arity {
    Unary,
    Binary,
}

/// Built-in math functions, keyed by name. Filled once by [`FunctionTable::create`] and only
/// read afterwards.
pub struct FunctionTable {
    unary: HashMap<String, UnaryFn>,
    binary: HashMap<String, BinaryFn>,
}

impl FunctionTable {
    pub fn empty() -> Self {
        FunctionTable {
            unary: HashMap::new(),
            binary: HashMap::new(),
        }
    }

    pub fn create() -> Self {
        let mut table = FunctionTable::empty();

        {
            let t = &mut table;
            set_unary(t, "sin", |x| x.sin());
            set_unary(t, "cos", |x| x.cos());
            set_unary(t, "tan", |x| x.tan());
            set_unary(t, "asin", |x| x.asin());
            set_unary(t, "acos", |x| x.acos());
            set_unary(t, "atan", |x| x.atan());
            set_unary(t, "sinh", |x| x.sinh());
            set_unary(t, "cosh", |x| x.cosh());
            set_unary(t, "tanh", |x| x.tanh());
            set_unary(t, "sqrt", |x| x.sqrt());
            set_unary(t, "exp", |x| x.exp());
            set_unary(t, "ln", |x| x.ln());
            set_unary(t, "log10", |x| x.log10());
            set_unary(t, "log2", |x| x.log2());
            set_unary(t, "abs", |x| x.abs());
            set_unary(t, "ceil", |x| x.ceil());
            set_unary(t, "floor", |x| x.floor());
            set_unary(t, "round", |x| x.round());

            set_binary(t, "pow", |x, y| x.powf(y));
            set_binary(t, "log", |x, y| x.log(y));
            set_binary(t, "hypot", |x, y| x.hypot(y));
            set_binary(t, "atan2", |x, y| x.atan2(y));
            set_binary(t, "min", |x, y| x.min(y));
            set_binary(t, "max", |x, y| x.max(y));
            set_binary(t, "rand", random_between);
        }

        table
    }

    /// Classify `name`, unary functions first.
    pub fn arity(&self, name: &str) -> Option<Arity> {
        if self.unary.contains_key(name) {
            Some(Arity::Unary)
        } else if self.binary.contains_key(name) {
            Some(Arity::Binary)
        } else {
            None
        }
    }

    pub fn call_unary(&self, name: &str, x: f64) -> Option<f64> {
        self.unary.get(name).map(|f| f(x))
    }

    pub fn call_binary(&self, name: &str, x: f64, y: f64) -> Option<f64> {
        self.binary.get(name).map(|f| f(x, y))
    }

    pub fn unary_names(&self) -> impl Iterator<Item = &str> {
        self.unary.keys().map(|k| k.as_str())
    }

    pub fn binary_names(&self) -> impl Iterator<Item = &str> {
        self.binary.keys().map(|k| k.as_str())
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FunctionTable({} unary, {} binary)",
            self.unary.len(),
            self.binary.len()
        )
    }
}

fn set_unary<F: 'static>(table: &mut FunctionTable, key: &str, fun: F)
where
    F: Fn(f64) -> f64,
{
    table.unary.insert(key.to_string(), Box::new(fun));
}

fn set_binary<F: 'static>(table: &mut FunctionTable, key: &str, fun: F)
where
    F: Fn(f64, f64) -> f64,
{
    table.binary.insert(key.to_string(), Box::new(fun));
}

// Uniform in [a, b); the bounds may come in either order.
fn random_between(a: f64, b: f64) -> f64 {
    if a == b || !(a.is_finite() && b.is_finite()) {
        return a;
    }

    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if !(hi - lo).is_finite() {
        return lo;
    }

    rand::thread_rng().gen_range(lo..hi)
}
