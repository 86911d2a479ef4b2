//! Wolfram Alpha short answers

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WolframAnswer {
    Answer(String),
    /// HTTP 501; the body sometimes explains why
    NotUnderstood(Option<String>),
    /// HTTP 400
    InvalidInput,
}

/// Map a short-answers response to an answer, naming the bot instead of
/// the service. `None` for statuses the API does not document.
pub fn interpret(status: u16, body: &str, bot_name: &str) -> Option<WolframAnswer> {
    let text = body
        .replace("Wolfram|Alpha", bot_name)
        .replace("Wolfram Alpha", bot_name);
    match status {
        200..=299 => Some(WolframAnswer::Answer(text)),
        501 => Some(WolframAnswer::NotUnderstood((!text.trim().is_empty()).then_some(text))),
        400 => Some(WolframAnswer::InvalidInput),
        _ => None,
    }
}
