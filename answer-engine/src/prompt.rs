//! Prompt builders: persona system message, grounded prompt with a bounded
//! document block, and the localized general-knowledge fallback.

use chat_history::{Role, Turn};
use knowledge_base::Snippet;

use crate::language::Language;

/// Persona shared by every model call.
pub const SYSTEM_PROMPT: &str = r#"You are ClassyBot, a professional virtual assistant for Classic Tech, a leading Internet Service Provider (ISP) and IPTV service provider.

Your job is to assist users with clear, accurate, and friendly responses related to:
- Internet and IPTV plans, pricing, and availability
- Installation, setup, and troubleshooting
- Billing, renewals, and account support
- Service status, outages, and maintenance
- Common issues like slow internet, router problems, login errors, or missing channels

Always respond concisely. Provide detailed help only when asked.
If a question is not related to Classic Tech, respond with:
"Please ask questions related to Classic Tech services."

Never guess or invent information."#;

/// Exact sentence the model must emit when the documents do not cover the question.
pub const NOT_FOUND_REPLY: &str = "I'm sorry, I couldn't find relevant information on that.";

/// Phrases that mark a grounded answer as unhelpful (matched lowercased).
pub const NON_ANSWER_MARKERS: &[&str] = &[
    "i don't know",
    "i'm not sure",
    "couldn't find",
    "not listed",
    "don't have",
    "थाहा छैन",
    "पक्का छैन",
    "फेला पार्न सकिन",
    "जानकारी छैन",
];

/// `true` if the answer is blank or contains a non-answer marker.
///
/// Typographic apostrophes (`’`) are folded to `'` before matching.
pub fn is_unhelpful(answer: &str) -> bool {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return true;
    }
    let folded = trimmed.to_lowercase().replace('\u{2019}', "'");
    NON_ANSWER_MARKERS.iter().any(|m| folded.contains(m))
}

/// Builds the grounded user prompt.
///
/// Layout: instructions, the last `history_window` turns, the question, then
/// the documents in rank order. The documents block never exceeds
/// `max_ctx_chars` bytes; the snippet that crosses the budget is cut on a
/// char boundary and later snippets are dropped.
pub fn build_grounded_prompt(
    question: &str,
    history: &[Turn],
    snippets: &[Snippet],
    history_window: usize,
    max_ctx_chars: usize,
) -> String {
    let mut out = String::new();
    out.push_str(
        "Only use the information in the documents below to answer the user's question.\n",
    );
    out.push_str("Never fabricate details that are not in the documents.\n");
    out.push_str("If no relevant information is found, say exactly:\n");
    out.push('"');
    out.push_str(NOT_FOUND_REPLY);
    out.push_str("\"\n");
    out.push_str("Do not mention or refer to the documents directly.\n\n");

    let recent = &history[history.len().saturating_sub(history_window)..];
    if !recent.is_empty() {
        out.push_str("Conversation so far:\n");
        for t in recent {
            let who = match t.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            out.push_str(who);
            out.push_str(": ");
            out.push_str(t.text.trim());
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str("Question: ");
    out.push_str(question.trim());
    out.push_str("\n\nRelevant Documents:\n");
    out.push_str(&documents_block(snippets, max_ctx_chars));
    out.push_str("\nAnswer:\n");
    out
}

/// Snippet texts separated by blank lines, bounded by `max_chars` bytes.
pub fn documents_block(snippets: &[Snippet], max_chars: usize) -> String {
    let mut out = String::new();
    let mut budget = max_chars;

    for s in snippets {
        let text = s.text.trim();
        if text.is_empty() {
            continue;
        }
        let sep = if out.is_empty() { 0 } else { 2 };
        if sep >= budget {
            break;
        }
        if sep > 0 {
            out.push_str("\n\n");
            budget -= sep;
        }
        if text.len() > budget {
            out.push_str(safe_truncate(text, budget));
            break;
        }
        out.push_str(text);
        budget -= text.len();
    }

    out
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Where the fallback sends users who need more help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referral {
    pub url: String,
    pub contact: String,
}

/// Builds the general-knowledge prompt for `language`.
///
/// No documents and no conversation history are included.
pub fn build_fallback_prompt(question: &str, language: Language, referral: &Referral) -> String {
    let q = question.trim();
    match language {
        Language::English => format!(
            "You are ClassyBot, a knowledgeable support assistant for Classic Tech (an ISP and IPTV provider in Nepal).\n\n\
             Please help the user with their question using your best general knowledge.\n\n\
             If you're not sure about the answer or the information isn't available, say so clearly \
             and suggest the user visit {url} or contact {contact}.\n\n\
             Never fabricate or guess information.\n\n\
             User question: {q}\n\n\
             Answer:\n",
            url = referral.url,
            contact = referral.contact,
        ),
        Language::Nepali => format!(
            "तपाईं ClassyBot हुनुहुन्छ, Classic Tech (नेपालको ISP तथा IPTV सेवा प्रदायक) को जानकार ग्राहक सहायता सहायक।\n\n\
             आफ्नो उत्तम सामान्य ज्ञान प्रयोग गरेर प्रयोगकर्ताको प्रश्नमा सहयोग गर्नुहोस्।\n\n\
             यदि उत्तरबारे निश्चित हुनुहुन्न वा जानकारी उपलब्ध छैन भने स्पष्ट रूपमा भन्नुहोस् \
             र प्रयोगकर्तालाई {url} हेर्न वा {contact} सँग सम्पर्क गर्न सुझाव दिनुहोस्।\n\n\
             कहिल्यै पनि जानकारी नबनाउनुहोस् वा अनुमान नगर्नुहोस्। नेपालीमा उत्तर दिनुहोस्।\n\n\
             प्रयोगकर्ताको प्रश्न: {q}\n\n\
             उत्तर:\n",
            url = referral.url,
            contact = referral.contact,
        ),
    }
}
