use crate::document::DocumentSnapshot;

/// Compose the single-turn request sent to the model.
///
/// Only the snapshot and the current instruction are included. Earlier turns
/// of the transcript are never replayed.
pub fn build_assist_prompt(snapshot: &DocumentSnapshot, instruction: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a professional writer. ");
    prompt.push_str("Please analyze the following text and provide feedback:\n\n");

    prompt.push_str("Document text:\n");
    prompt.push_str(snapshot.text());
    prompt.push_str("\n\n");

    prompt.push_str("User request: ");
    prompt.push_str(instruction);
    prompt.push_str("\n\n");

    prompt.push_str("Try to sound less like an AI and more personal, ");
    prompt.push_str("while still remaining professional.");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_snapshot_then_instruction() {
        let snapshot = DocumentSnapshot::new("Their going to the store.");
        let prompt = build_assist_prompt(&snapshot, "Fix grammar");

        let doc_at = prompt.find("Their going to the store.").unwrap();
        let req_at = prompt.find("User request: Fix grammar").unwrap();
        assert!(prompt.starts_with("You are a professional writer."));
        assert!(doc_at < req_at);
        assert!(prompt.ends_with("while still remaining professional."));
    }

    #[test]
    fn test_empty_document_still_produces_framing() {
        let prompt = build_assist_prompt(&DocumentSnapshot::new(""), "Check spelling");
        assert!(prompt.contains("Document text:\n\n\nUser request: Check spelling"));
    }
}
