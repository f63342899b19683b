/// Prefix for the rolling summary when it is injected into a prompt
pub const SUMMARY_CONTEXT_PREFIX: &str = "Here is a summary of the conversation so far:\n";

pub const TITLE_PROMPT_TEMPLATE: &str = "Write a title for the conversation below. \
The title must be 1 to 3 words describing its topic, with no quotes and no trailing punctuation. \
Reply with the title only.

Conversation:
<transcript>";

pub const SUMMARY_PROMPT_TEMPLATE: &str = "Summarize the conversation below in at most 10 bullet points. \
Cover the user's objectives, decisions made, constraints mentioned and tasks still pending. \
Do not include verbatim code. Keep the summary under 500 tokens.

Conversation:
<transcript>";

pub const DEFAULT_TITLE: &str = "Untitled Chat";
