// ABOUTME: Crate-wide constants: version info and the fixed built-in function table

pub const VERSION: &str = "0.1.0";

/// Names recognized by the CSE machine's GAMMA rule when the rator is an
/// unbound identifier (§4.3.3). Order is not significant; membership is.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "Print",
    "print",
    "Order",
    "Y*",
    "Conc",
    "Stem",
    "Stern",
    "Isinteger",
    "Isstring",
    "Istuple",
    "Isempty",
    "ItoS",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}
