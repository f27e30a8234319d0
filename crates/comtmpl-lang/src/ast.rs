pub mod error;
pub mod node;
pub mod parser;

pub type Nodes = Vec<node::Node>;
