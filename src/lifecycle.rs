//! Order lifecycle: the five statuses, the events that move between them and
//! the actor each event demands. Every status change in the storage layer goes
//! through this table; the database only ever sees the two-letter codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Persisted and serialized as the two-letter codes `WS`/`OK`/`OR`/`OC`/`OF`;
/// every external representation round-trips them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "WS")]
    Submitted,
    #[serde(rename = "OK")]
    Accepted,
    #[serde(rename = "OR")]
    Refused,
    #[serde(rename = "OC")]
    Canceled,
    #[serde(rename = "OF")]
    Finished,
}

impl OrderStatus {
    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::Submitted => "WS",
            OrderStatus::Accepted => "OK",
            OrderStatus::Refused => "OR",
            OrderStatus::Canceled => "OC",
            OrderStatus::Finished => "OF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WS" => Some(OrderStatus::Submitted),
            "OK" => Some(OrderStatus::Accepted),
            "OR" => Some(OrderStatus::Refused),
            "OC" => Some(OrderStatus::Canceled),
            "OF" => Some(OrderStatus::Finished),
            _ => None,
        }
    }

    /// `finished` is derived state: true iff the status is terminal.
    pub fn finished(self) -> bool {
        matches!(
            self,
            OrderStatus::Refused | OrderStatus::Canceled | OrderStatus::Finished
        )
    }

    /// Applies a lifecycle event, enforcing the transition table. Rejects
    /// (never silently ignores) events fired from the wrong state.
    pub fn apply(self, event: OrderEvent) -> Result<OrderStatus, TransitionError> {
        let expected = event.source();
        if self == expected {
            return Ok(event.target());
        }
        if self.finished() {
            Err(TransitionError::AlreadyFinished { current: self })
        } else {
            Err(TransitionError::WrongState {
                current: self,
                event,
            })
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderStatus::from_code(&value).ok_or_else(|| format!("unknown order status {value:?}"))
    }
}

/// Who fires an event. Customer events are additionally scoped to the owning
/// customer at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Customer,
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    CustomerCancel,
    Accept,
    Refuse,
    StoreCancel,
    Finish,
}

impl OrderEvent {
    /// The only state the event may fire from.
    pub fn source(self) -> OrderStatus {
        match self {
            OrderEvent::CustomerCancel | OrderEvent::Accept | OrderEvent::Refuse => {
                OrderStatus::Submitted
            }
            OrderEvent::StoreCancel | OrderEvent::Finish => OrderStatus::Accepted,
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            OrderEvent::CustomerCancel | OrderEvent::StoreCancel => OrderStatus::Canceled,
            OrderEvent::Accept => OrderStatus::Accepted,
            OrderEvent::Refuse => OrderStatus::Refused,
            OrderEvent::Finish => OrderStatus::Finished,
        }
    }

    pub fn required_actor(self) -> ActorKind {
        match self {
            OrderEvent::CustomerCancel => ActorKind::Customer,
            OrderEvent::Accept
            | OrderEvent::Refuse
            | OrderEvent::StoreCancel
            | OrderEvent::Finish => ActorKind::Employee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("ORDER_ALREADY_FINISHED")]
    AlreadyFinished { current: OrderStatus },

    #[error("ORDER_NOT_IN_REQUIRED_STATE")]
    WrongState {
        current: OrderStatus,
        event: OrderEvent,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 5] = [
        OrderStatus::Submitted,
        OrderStatus::Accepted,
        OrderStatus::Refused,
        OrderStatus::Canceled,
        OrderStatus::Finished,
    ];

    const ALL_EVENTS: [OrderEvent; 5] = [
        OrderEvent::CustomerCancel,
        OrderEvent::Accept,
        OrderEvent::Refuse,
        OrderEvent::StoreCancel,
        OrderEvent::Finish,
    ];

    #[test]
    fn codes_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(OrderStatus::from_code("XX"), None);
    }

    #[test]
    fn json_uses_the_short_codes() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Submitted).unwrap(),
            "\"WS\""
        );
        let back: OrderStatus = serde_json::from_str("\"OF\"").unwrap();
        assert_eq!(back, OrderStatus::Finished);
    }

    #[test]
    fn finished_matches_terminal_states() {
        assert!(!OrderStatus::Submitted.finished());
        assert!(!OrderStatus::Accepted.finished());
        assert!(OrderStatus::Refused.finished());
        assert!(OrderStatus::Canceled.finished());
        assert!(OrderStatus::Finished.finished());
    }

    #[test]
    fn submitted_transitions() {
        assert_eq!(
            OrderStatus::Submitted.apply(OrderEvent::CustomerCancel),
            Ok(OrderStatus::Canceled)
        );
        assert_eq!(
            OrderStatus::Submitted.apply(OrderEvent::Accept),
            Ok(OrderStatus::Accepted)
        );
        assert_eq!(
            OrderStatus::Submitted.apply(OrderEvent::Refuse),
            Ok(OrderStatus::Refused)
        );
    }

    #[test]
    fn accepted_transitions() {
        assert_eq!(
            OrderStatus::Accepted.apply(OrderEvent::StoreCancel),
            Ok(OrderStatus::Canceled)
        );
        assert_eq!(
            OrderStatus::Accepted.apply(OrderEvent::Finish),
            Ok(OrderStatus::Finished)
        );
    }

    #[test]
    fn terminal_states_accept_no_event() {
        for status in [
            OrderStatus::Refused,
            OrderStatus::Canceled,
            OrderStatus::Finished,
        ] {
            for event in ALL_EVENTS {
                assert_eq!(
                    status.apply(event),
                    Err(TransitionError::AlreadyFinished { current: status }),
                    "{status:?} must reject {event:?}"
                );
            }
        }
    }

    #[test]
    fn wrong_state_is_rejected_not_ignored() {
        assert_eq!(
            OrderStatus::Submitted.apply(OrderEvent::Finish),
            Err(TransitionError::WrongState {
                current: OrderStatus::Submitted,
                event: OrderEvent::Finish,
            })
        );
        assert_eq!(
            OrderStatus::Accepted.apply(OrderEvent::CustomerCancel),
            Err(TransitionError::WrongState {
                current: OrderStatus::Accepted,
                event: OrderEvent::CustomerCancel,
            })
        );
    }

    #[test]
    fn customer_may_only_cancel_submitted() {
        for event in ALL_EVENTS {
            let actor = event.required_actor();
            match event {
                OrderEvent::CustomerCancel => assert_eq!(actor, ActorKind::Customer),
                _ => assert_eq!(actor, ActorKind::Employee),
            }
        }
    }
}
