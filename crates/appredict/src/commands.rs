//! Result command names for the Ap Predict collection API.

use std::fmt;

/// The five result payloads a finished run exposes, named as they appear
/// in the collection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCommand {
    QNet,
    VoltageTraces,
    VoltageResults,
    PkpdResults,
    Messages,
}

impl ResultCommand {
    /// Every result command, in fetch order.
    pub const ALL: [ResultCommand; 5] = [
        ResultCommand::QNet,
        ResultCommand::VoltageTraces,
        ResultCommand::VoltageResults,
        ResultCommand::PkpdResults,
        ResultCommand::Messages,
    ];

    /// The path segment used in `/api/collection/{call_id}/{command}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCommand::QNet => "q_net",
            ResultCommand::VoltageTraces => "voltage_traces",
            ResultCommand::VoltageResults => "voltage_results",
            ResultCommand::PkpdResults => "pkpd_results",
            ResultCommand::Messages => "messages",
        }
    }
}

impl fmt::Display for ResultCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
