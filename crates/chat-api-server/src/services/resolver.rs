use crate::document::Document;

/// Returned verbatim when no document matches. Clients match on this string,
/// so it must not change.
pub const FALLBACK_REPLY: &str = "Sorry, I don't have information about that.";

/// Pick the reply for a user message by scanning the corpus in stored order
/// and returning the content of the first document whose title matches.
///
/// A title matches when, after lowercasing both sides, it appears as a
/// substring of the message, or when message and title both mention
/// "password" or both mention "refund". Matching is raw substring, not
/// tokenized: a title contained in an unrelated word still matches.
pub fn resolve<'a>(user_message: &str, documents: &'a [Document]) -> &'a str {
    let normalized = user_message.to_lowercase();

    for doc in documents {
        let title = doc.title.to_lowercase();

        if normalized.contains(&title)
            || (normalized.contains("password") && title.contains("password"))
            || (normalized.contains("refund") && title.contains("refund"))
        {
            return &doc.content;
        }
    }

    FALLBACK_REPLY
}
