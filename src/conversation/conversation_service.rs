use uuid::Uuid;

use crate::conversation::conversation_dto::ConversationListRow;
use crate::conversation::conversation_models::{Conversation, ConversationStatus};
use crate::conversation::conversation_repository::ConversationRepository;
use crate::error::{AppError, Result};

/// What sending a message does to an existing conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTransition {
    /// Keep the conversation as it is.
    Reuse,
    /// The original recipient replied, which accepts the request.
    Accept,
    /// The conversation was rejected; no further messages are allowed.
    Blocked,
}

/// Pure transition rule for sends into an existing conversation. Replying is
/// the only send that moves PENDING on; REJECTED admits no sends at all.
pub fn transition_on_send(conversation: &Conversation, sender_id: Uuid) -> SendTransition {
    match conversation.status {
        ConversationStatus::Rejected => SendTransition::Blocked,
        ConversationStatus::Accepted => SendTransition::Reuse,
        ConversationStatus::Pending => {
            if sender_id == conversation.recipient_id {
                SendTransition::Accept
            } else {
                SendTransition::Reuse
            }
        }
    }
}

/// A recipient's explicit answer to a conversation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    fn as_status(self) -> ConversationStatus {
        match self {
            Verdict::Accept => ConversationStatus::Accepted,
            Verdict::Reject => ConversationStatus::Rejected,
        }
    }
}

/// What an explicit accept or reject does to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictTransition {
    /// The request is still open; write the verdict.
    Apply,
    /// Already accepted; hand the row back unchanged.
    Reuse,
    /// Rejected conversations admit no further verdicts.
    Blocked,
    /// An accepted conversation cannot be overturned to rejected.
    Refuse,
}

/// Pure transition rule for explicit recipient verdicts. A verdict answers a
/// PENDING request; once settled, the only tolerated repeat is accepting an
/// already accepted conversation.
pub fn transition_on_verdict(conversation: &Conversation, verdict: Verdict) -> VerdictTransition {
    match (conversation.status, verdict) {
        (ConversationStatus::Pending, _) => VerdictTransition::Apply,
        (ConversationStatus::Accepted, Verdict::Accept) => VerdictTransition::Reuse,
        (ConversationStatus::Accepted, Verdict::Reject) => VerdictTransition::Refuse,
        (ConversationStatus::Rejected, _) => VerdictTransition::Blocked,
    }
}

#[derive(Clone)]
pub struct ConversationService {
    repo: ConversationRepository,
}

impl ConversationService {
    pub fn new(repo: ConversationRepository) -> Self {
        Self { repo }
    }

    /// Finds or creates the conversation a new message belongs to, applying
    /// the send transition along the way. A lost insert race is re-read and
    /// treated as reuse of the surviving row.
    pub async fn resolve_for_send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Conversation> {
        if let Some(conversation) = self.repo.find_by_pair(sender_id, recipient_id).await? {
            return self.apply_send_transition(conversation, sender_id).await;
        }

        match self.repo.insert_pending(sender_id, recipient_id).await? {
            Some(created) => Ok(created),
            None => {
                // Another request created the pair between our read and write.
                let conversation = self
                    .repo
                    .find_by_pair(sender_id, recipient_id)
                    .await?
                    .ok_or(AppError::InternalError)?;
                self.apply_send_transition(conversation, sender_id).await
            }
        }
    }

    async fn apply_send_transition(
        &self,
        mut conversation: Conversation,
        sender_id: Uuid,
    ) -> Result<Conversation> {
        loop {
            match transition_on_send(&conversation, sender_id) {
                SendTransition::Reuse => return Ok(conversation),
                SendTransition::Blocked => {
                    return Err(AppError::ConversationBlocked(
                        "This conversation has been rejected".to_string(),
                    ))
                }
                SendTransition::Accept => {
                    if let Some(updated) = self
                        .repo
                        .set_status_if_pending(conversation.id, ConversationStatus::Accepted)
                        .await?
                    {
                        return Ok(updated);
                    }
                    // The row left PENDING between our read and write; judge
                    // the surviving status instead.
                    conversation = self.reload(conversation.id).await?;
                }
            }
        }
    }

    pub async fn accept(&self, conversation_id: Uuid, user_id: Uuid) -> Result<Conversation> {
        self.respond(conversation_id, user_id, Verdict::Accept).await
    }

    pub async fn reject(&self, conversation_id: Uuid, user_id: Uuid) -> Result<Conversation> {
        self.respond(conversation_id, user_id, Verdict::Reject).await
    }

    /// Recipient's verdict on a conversation request. Only the user who was
    /// messaged first may respond, and only a pending request takes a
    /// verdict; the sole tolerated repeat is re-accepting an accepted
    /// conversation.
    async fn respond(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        verdict: Verdict,
    ) -> Result<Conversation> {
        let mut conversation = self.reload(conversation_id).await?;

        if conversation.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Only the conversation recipient can respond to a request".to_string(),
            ));
        }

        loop {
            match transition_on_verdict(&conversation, verdict) {
                VerdictTransition::Reuse => return Ok(conversation),
                VerdictTransition::Blocked => {
                    return Err(AppError::ConversationBlocked(
                        "This conversation has been rejected".to_string(),
                    ))
                }
                VerdictTransition::Refuse => {
                    return Err(AppError::Forbidden(
                        "An accepted conversation cannot be rejected".to_string(),
                    ))
                }
                VerdictTransition::Apply => {
                    if let Some(updated) = self
                        .repo
                        .set_status_if_pending(conversation.id, verdict.as_status())
                        .await?
                    {
                        return Ok(updated);
                    }
                    // The row left PENDING between our read and write; judge
                    // the surviving status instead.
                    conversation = self.reload(conversation.id).await?;
                }
            }
        }
    }

    async fn reload(&self, conversation_id: Uuid) -> Result<Conversation> {
        self.repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))
    }

    pub async fn find_by_id(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        self.repo.find_by_id(conversation_id).await
    }

    /// Loads a conversation and checks the caller is one of its two parties.
    pub async fn find_for_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Conversation> {
        let conversation = self
            .repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

        if !conversation.involves(user_id) {
            return Err(AppError::Forbidden(
                "You are not a participant of this conversation".to_string(),
            ));
        }

        Ok(conversation)
    }

    pub async fn record_last_message(&self, conversation_id: Uuid, message_id: Uuid) -> Result<()> {
        self.repo.set_last_message(conversation_id, message_id).await
    }

    pub async fn list_overview(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationListRow>> {
        self.repo.list_for_user(user_id, search, limit, offset).await
    }

    pub async fn count_overview(&self, user_id: Uuid, search: Option<&str>) -> Result<i64> {
        self.repo.count_for_user(user_id, search).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn conversation(status: ConversationStatus, initiator: Uuid, recipient: Uuid) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            initiator_id: initiator,
            recipient_id: recipient,
            status,
            last_message_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_transition_on_send_follows_lifecycle() {
        let initiator = Uuid::new_v4();
        let recipient = Uuid::new_v4();

        let cases = [
            (ConversationStatus::Pending, initiator, SendTransition::Reuse),
            (ConversationStatus::Pending, recipient, SendTransition::Accept),
            (ConversationStatus::Accepted, initiator, SendTransition::Reuse),
            (ConversationStatus::Accepted, recipient, SendTransition::Reuse),
            (ConversationStatus::Rejected, initiator, SendTransition::Blocked),
            (ConversationStatus::Rejected, recipient, SendTransition::Blocked),
        ];

        for (status, sender, expected) in cases {
            let conversation = conversation(status, initiator, recipient);
            assert_eq!(
                transition_on_send(&conversation, sender),
                expected,
                "status {:?} with sender {:?}",
                status,
                sender
            );
        }
    }

    #[test]
    fn test_reply_is_the_only_path_out_of_pending() {
        let initiator = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let pending = conversation(ConversationStatus::Pending, initiator, recipient);

        // Follow-up messages from the initiator never auto-accept.
        assert_eq!(transition_on_send(&pending, initiator), SendTransition::Reuse);
        // A third party is not the stored recipient either.
        assert_eq!(
            transition_on_send(&pending, Uuid::new_v4()),
            SendTransition::Reuse
        );
        assert_eq!(transition_on_send(&pending, recipient), SendTransition::Accept);
    }

    #[test]
    fn test_transition_on_verdict_follows_lifecycle() {
        let initiator = Uuid::new_v4();
        let recipient = Uuid::new_v4();

        let cases = [
            (ConversationStatus::Pending, Verdict::Accept, VerdictTransition::Apply),
            (ConversationStatus::Pending, Verdict::Reject, VerdictTransition::Apply),
            (ConversationStatus::Accepted, Verdict::Accept, VerdictTransition::Reuse),
            (ConversationStatus::Accepted, Verdict::Reject, VerdictTransition::Refuse),
            (ConversationStatus::Rejected, Verdict::Accept, VerdictTransition::Blocked),
            (ConversationStatus::Rejected, Verdict::Reject, VerdictTransition::Blocked),
        ];

        for (status, verdict, expected) in cases {
            let conversation = conversation(status, initiator, recipient);
            assert_eq!(
                transition_on_verdict(&conversation, verdict),
                expected,
                "status {:?} with verdict {:?}",
                status,
                verdict
            );
        }
    }

    #[test]
    fn test_settled_conversations_take_no_new_verdict() {
        let initiator = Uuid::new_v4();
        let recipient = Uuid::new_v4();

        // A rejected conversation never reopens, not even through accept.
        let rejected = conversation(ConversationStatus::Rejected, initiator, recipient);
        assert_eq!(
            transition_on_verdict(&rejected, Verdict::Accept),
            VerdictTransition::Blocked
        );
        assert_eq!(
            transition_on_verdict(&rejected, Verdict::Reject),
            VerdictTransition::Blocked
        );

        // An accepted conversation cannot be overturned; re-accepting is the
        // only tolerated repeat and writes nothing.
        let accepted = conversation(ConversationStatus::Accepted, initiator, recipient);
        assert_eq!(
            transition_on_verdict(&accepted, Verdict::Reject),
            VerdictTransition::Refuse
        );
        assert_eq!(
            transition_on_verdict(&accepted, Verdict::Accept),
            VerdictTransition::Reuse
        );
    }

    #[test]
    fn test_verdict_targets_matching_status() {
        assert_eq!(Verdict::Accept.as_status(), ConversationStatus::Accepted);
        assert_eq!(Verdict::Reject.as_status(), ConversationStatus::Rejected);
    }
}
