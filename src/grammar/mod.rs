pub mod eliminate_left_recursion;
pub mod grammar;
pub mod left_factoring;
pub mod ll1_parser;
pub mod ll1_table;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;
pub use grammar::{Grammar, Production, Rule, Symbol};

pub const EPSILON: char = '#';
pub const END_MARK: char = '$';
pub const IDENTIFIER: &str = "id";

pub const MAX_RULES: usize = 100;
pub const MAX_PRODUCTIONS: usize = 10;
pub const MAX_PRODUCTION_LEN: usize = 50;
pub const MAX_SET_SIZE: usize = 20;
pub const MAX_STACK_SIZE: usize = 100;
pub const MAX_INPUT_LINES: usize = 100;
pub const MAX_STORED_ERRORS: usize = 10;
pub const ERROR_LIMIT: usize = 20;
