pub mod round_flow;

pub use round_flow::RoundFlowService;
