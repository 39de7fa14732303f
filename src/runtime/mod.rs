// 运行时执行引擎模块

mod graph;

pub use graph::{WorkflowGraph, WorkflowGraphBuilder};
