//! Assembles the instruction string sent in the session handshake.

use haggle_core::NegotiationContext;

/// Build the opaque instruction block for one negotiation. The agent
/// plays a homeowner, never reveals its ceiling, and works the quoted
/// price down before accepting.
pub fn build_instructions(ctx: &NegotiationContext) -> String {
    let mut out = format!(
        "You are a homeowner calling {counterparty} about this problem: {problem}. \
The job is at {location}. You want the work done as cheaply as possible. \
Your absolute maximum budget is ${ceiling:.2}, but never reveal that number. \
Ask for a quote, push back on the first price, and only agree once the price \
stops moving or fits comfortably under your budget. Speak naturally and keep \
your turns short, this is a phone call.",
        counterparty = ctx.counterparty,
        problem = ctx.problem,
        location = ctx.location,
        ceiling = ctx.ceiling_price,
    );

    if !ctx.extra_answers.is_empty() {
        out.push_str("\n\nDetails you already know, use them if asked:");
        for (question, answer) in &ctx.extra_answers {
            out.push_str(&format!("\n- {question}: {answer}"));
        }
    }

    out
}
