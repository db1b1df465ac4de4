//! Request-context assembly.
//!
//! Two shapes, one per flow:
//!
//! - [`assemble`]: `[system] + prior history + [new input]`. Used for typed-in
//!   mistakes, so the model sees every earlier problem and its analysis.
//! - [`single_turn`]: `[system, new input]`. Used for photographed mistakes,
//!   which are analyzed without any memory of earlier turns.
//!
//! The two flows differ on purpose and must stay that way.

use mathdesk_core::message::Message;
use mathdesk_core::record::Record;

/// Build a cumulative context from a student's stored exchanges.
///
/// Only text exchanges are replayed, each with its stored role; image
/// analyses have no user turn to replay and are left out.
pub fn assemble(system: &str, prior: &[Record], new_input: Message) -> Vec<Message> {
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(Message::system(system));
    messages.extend(prior.iter().filter_map(Record::to_message));
    messages.push(new_input);
    messages
}

/// Build a context with no history at all.
pub fn single_turn(system: &str, new_input: Message) -> Vec<Message> {
    vec![Message::system(system), new_input]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathdesk_core::message::Role;

    #[test]
    fn first_submission_has_no_history() {
        let messages = assemble("sys", &[], Message::user("q1"));
        assert_eq!(messages, vec![Message::system("sys"), Message::user("q1")]);
    }

    #[test]
    fn prior_pairs_are_replayed_in_order() {
        let prior = vec![
            Record::user("q1"),
            Record::assistant("a1"),
            Record::user("q2"),
            Record::assistant("a2"),
        ];
        let messages = assemble("sys", &prior, Message::user("q3"));

        assert_eq!(messages.len(), 1 + 4 + 1);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].text(), "q2");
        assert_eq!(messages[5].text(), "q3");
    }

    #[test]
    fn image_analyses_are_not_replayed() {
        let prior = vec![
            Record::user("q1"),
            Record::assistant("a1"),
            Record::image_analysis("拍照错题分析", "photo result"),
        ];
        let messages = assemble("sys", &prior, Message::user("q2"));
        assert_eq!(messages.len(), 4);
        assert!(messages.iter().all(|m| m.text() != "photo result"));
    }

    #[test]
    fn single_turn_is_two_messages() {
        let input = Message::user_with_image("data:image/png;base64,AAAA", "看图");
        let messages = single_turn("sys", input.clone());
        assert_eq!(messages, vec![Message::system("sys"), input]);
    }
}
