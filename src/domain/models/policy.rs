/// Failure routing for the relay handler.
///
/// `Suppress` keeps the long-standing swallow-and-log behavior: the delivery
/// infrastructure sees success and will not redeliver, so a failed move is
/// lost unless someone reads the logs. `Propagate` restores redelivery by
/// returning the error to the invoker. `DeadLetter` records the failure on a
/// topic before reporting success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Suppress,
    Propagate,
    DeadLetter {
        topic: String,
    },
}

impl ErrorPolicy {
    /// Parse a policy string: `suppress`, `propagate`, or `dead-letter:<topic>`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "suppress" => Some(ErrorPolicy::Suppress),
            "propagate" => Some(ErrorPolicy::Propagate),
            other => match other.strip_prefix("dead-letter:") {
                Some(topic) if !topic.is_empty() => Some(ErrorPolicy::DeadLetter {
                    topic: topic.to_string(),
                }),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Suppress => write!(f, "suppress"),
            ErrorPolicy::Propagate => write!(f, "propagate"),
            ErrorPolicy::DeadLetter { topic } => write!(f, "dead-letter:{}", topic),
        }
    }
}
