//! Sample binary used by the integration tests

use std::env;

/* Entry point.
   Prints a greeting. */
fn main() {
    let name = env::args().nth(1).unwrap_or_else(|| "world".to_string());
    // greet the caller
    println!("Hello, {}! // not a comment", name);
}
