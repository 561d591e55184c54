//! Keyword chat responder.
//!
//! A fixed decision table: an ordered list of (predicate, response) pairs
//! evaluated first-match-wins over the lowercased message. No state is
//! kept between calls; the suggestions list is constant regardless of the
//! branch taken.

use crate::api::{ChatRequest, ChatResponse};
use crate::validation::{ValidationError, Validator};

/// Hard cap on message length, matching the original validator.
pub const MAX_MESSAGE_LEN: usize = 1000;

const LEAF_SPOT_ADVISORY: &str = "Based on your description of leaf spots, this could be a fungal disease. Common causes include leaf blight or leaf spot diseases. I recommend checking for circular or irregular brown spots on leaves. Would you like me to show you some common leaf spot diseases and their treatments?";

const WILT_ADVISORY: &str = "Wilting symptoms can be caused by various factors including bacterial wilt, fungal diseases, or water stress. Can you describe the pattern of wilting? Is it affecting the whole plant or just certain leaves?";

const INSECT_ADVISORY: &str = "For insect identification, it would help to know the size, color, and behavior of the pest. Can you describe what the insect looks like? Also, what type of crop is affected?";

const FALLBACK_ADVISORY: &str = "I'd be happy to help identify pests or diseases. Please describe the symptoms you're observing, such as: leaf discoloration, spots, wilting, insect damage, or any other unusual signs. Also mention what crop or plant is affected.";

/// The four fixed follow-up suggestions.
pub const SUGGESTIONS: [&str; 4] = [
    "Show me common leaf diseases",
    "Help identify insect pests",
    "What causes plant wilting?",
    "Recommend pest control methods",
];

fn leaf_spot(m: &str) -> bool {
    m.contains("leaf") && m.contains("spot")
}

fn wilt(m: &str) -> bool {
    m.contains("wilt")
}

fn insect(m: &str) -> bool {
    m.contains("insect") || m.contains("bug")
}

/// Branch order matters: the first matching rule wins.
static RULES: &[(fn(&str) -> bool, &str)] = &[
    (leaf_spot, LEAF_SPOT_ADVISORY),
    (wilt, WILT_ADVISORY),
    (insect, INSECT_ADVISORY),
];

/// Select the advisory for a message. Pure given its input.
pub fn advisory_for(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|(predicate, _)| predicate(&lowered))
        .map(|(_, response)| *response)
        .unwrap_or(FALLBACK_ADVISORY)
}

/// Validate a chat request and produce the canned response.
///
/// The `context` field is accepted but never consumed.
pub fn respond(req: &ChatRequest) -> Result<ChatResponse, ValidationError> {
    // Input is trimmed before validation, so a whitespace-only message
    // fails the required check instead of reaching the fallback.
    let message = req.message.trim();

    let mut v = Validator::new();
    v.required("message", message);
    v.max_len("message", message, MAX_MESSAGE_LEN);
    v.finish()?;

    Ok(ChatResponse {
        response: advisory_for(message).to_string(),
        suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            context: None,
        }
    }

    #[test]
    fn leaf_spot_branch() {
        let r = respond(&request("my leaf has a brown spot")).unwrap();
        assert!(r.response.contains("fungal disease"));
    }

    #[test]
    fn wilt_branch() {
        let r = respond(&request("the whole plant is wilting")).unwrap();
        assert!(r.response.contains("Wilting symptoms"));
    }

    #[test]
    fn insect_branch() {
        let r = respond(&request("I see a strange bug")).unwrap();
        assert!(r.response.contains("insect identification"));
    }

    #[test]
    fn fallback_branch() {
        let r = respond(&request("what should I do")).unwrap();
        assert!(r.response.starts_with("I'd be happy to help"));
    }

    #[test]
    fn leaf_without_spot_falls_through_to_wilt() {
        // "leaf" alone must not trigger the leaf-spot branch.
        let r = respond(&request("every leaf is wilting")).unwrap();
        assert!(r.response.contains("Wilting symptoms"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let r = respond(&request("LEAF SPOT everywhere")).unwrap();
        assert!(r.response.contains("fungal disease"));
    }

    #[test]
    fn suggestions_constant_across_branches() {
        let a = respond(&request("leaf spot")).unwrap();
        let b = respond(&request("anything else")).unwrap();
        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.suggestions.len(), 4);
    }

    #[test]
    fn empty_message_rejected() {
        let err = respond(&request("")).unwrap_err();
        assert_eq!(err.errors[0].field, "message");
    }

    #[test]
    fn whitespace_only_message_rejected() {
        let err = respond(&request("   \t ")).unwrap_err();
        assert_eq!(err.errors[0].field, "message");
    }

    #[test]
    fn message_length_boundary() {
        assert!(respond(&request(&"a".repeat(1000))).is_ok());
        let err = respond(&request(&"a".repeat(1001))).unwrap_err();
        assert_eq!(err.errors[0].field, "message");
    }

    #[test]
    fn context_is_ignored() {
        let req = ChatRequest {
            message: "leaf spot".to_string(),
            context: Some(vec![serde_json::json!({"role": "user"})]),
        };
        let with = respond(&req).unwrap();
        let without = respond(&request("leaf spot")).unwrap();
        assert_eq!(with.response, without.response);
    }
}
