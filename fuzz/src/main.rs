#[macro_use]
extern crate afl;

use deskcalc::{Outcome, Session, Store};

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(input) = std::str::from_utf8(data) {
            // only `show` is harmless against the real filesystem
            if input.contains("save") || input.contains("load") {
                return;
            }

            let mut session = Session::from_text(input, Store::new("/nonexistent"));

            loop {
                match session.next() {
                    Ok(Outcome::Quit) => break,
                    Ok(_) => (),
                    Err(_) => {
                        if session.recover().is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });
}
