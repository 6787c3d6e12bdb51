//! Text grammars embedded in commands and rule blocks

pub mod block;
pub mod placeholder;
