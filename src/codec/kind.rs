use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Single byte tag carried in every record header.
///
/// The set is closed: bytes outside of it decode to [EventKind::Unknown] so that an unrecognised
/// record never stops a replay, it just gets the generic body.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum EventKind {
    New,
    PartiallyFilled,
    Filled,
    DoneForDay,
    Canceled,
    Replaced,
    PendingCancel,
    Stopped,
    Rejected,
    Suspended,
    PendingNew,
    Calculated,
    Expired,
    AcceptedForBidding,
    PendingReplace,
    RiskRejected,
    UnconfirmedNew,
    UnconfirmedCancel,
    UnconfirmedReplace,
    CancelRejected,
    Comment,
    //Written only by a rollover, tells the engine that a fill on a carried order already happened
    Executed,
    #[display("Unknown({_0})")]
    Unknown(u8),
}

impl From<u8> for EventKind {
    fn from(value: u8) -> Self {
        match value {
            b'0' => Self::New,
            b'1' => Self::PartiallyFilled,
            b'2' => Self::Filled,
            b'3' => Self::DoneForDay,
            b'4' => Self::Canceled,
            b'5' => Self::Replaced,
            b'6' => Self::PendingCancel,
            b'7' => Self::Stopped,
            b'8' => Self::Rejected,
            b'9' => Self::Suspended,
            b'A' => Self::PendingNew,
            b'B' => Self::Calculated,
            b'C' => Self::Expired,
            b'D' => Self::AcceptedForBidding,
            b'E' => Self::PendingReplace,
            b'a' => Self::RiskRejected,
            b'b' => Self::UnconfirmedNew,
            b'c' => Self::UnconfirmedCancel,
            b'd' => Self::UnconfirmedReplace,
            b'e' => Self::CancelRejected,
            b'f' => Self::Executed,
            b'#' => Self::Comment,
            other => Self::Unknown(other),
        }
    }
}

impl From<EventKind> for u8 {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::New => b'0',
            EventKind::PartiallyFilled => b'1',
            EventKind::Filled => b'2',
            EventKind::DoneForDay => b'3',
            EventKind::Canceled => b'4',
            EventKind::Replaced => b'5',
            EventKind::PendingCancel => b'6',
            EventKind::Stopped => b'7',
            EventKind::Rejected => b'8',
            EventKind::Suspended => b'9',
            EventKind::PendingNew => b'A',
            EventKind::Calculated => b'B',
            EventKind::Expired => b'C',
            EventKind::AcceptedForBidding => b'D',
            EventKind::PendingReplace => b'E',
            EventKind::RiskRejected => b'a',
            EventKind::UnconfirmedNew => b'b',
            EventKind::UnconfirmedCancel => b'c',
            EventKind::UnconfirmedReplace => b'd',
            EventKind::CancelRejected => b'e',
            EventKind::Executed => b'f',
            EventKind::Comment => b'#',
            EventKind::Unknown(other) => other,
        }
    }
}

impl EventKind {
    /// Kinds after which an order can never come back to life.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RiskRejected
                | Self::Canceled
                | Self::Rejected
                | Self::Expired
                | Self::Calculated
                | Self::DoneForDay
        )
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Self::PartiallyFilled | Self::Filled)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Side {
    Buy,
    Sell,
    Short,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    Otc,
    Cross,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum TimeInForce {
    Day,
    GoodTillCancel,
    AtTheOpening,
    ImmediateOrCancel,
    FillOrKill,
    GoodTillCrossing,
    GoodTillDate,
}

/// Whether a fill reports a new trade or amends one reported earlier. Only `New` and `Cancel`
/// move outstanding quantity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ExecTransType {
    New,
    Cancel,
    Correct,
    Status,
}

// Order enums travel in the body as one character tokens
fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(first)
}

impl Side {
    pub fn from_token(token: &str) -> Option<Self> {
        match single_char(token)? {
            '1' => Some(Self::Buy),
            '2' => Some(Self::Sell),
            '5' => Some(Self::Short),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
            Self::Short => '5',
        }
    }
}

impl OrderType {
    pub fn from_token(token: &str) -> Option<Self> {
        match single_char(token)? {
            '1' => Some(Self::Market),
            '2' => Some(Self::Limit),
            '3' => Some(Self::Stop),
            '4' => Some(Self::StopLimit),
            'o' => Some(Self::Otc),
            'x' => Some(Self::Cross),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Market => '1',
            Self::Limit => '2',
            Self::Stop => '3',
            Self::StopLimit => '4',
            Self::Otc => 'o',
            Self::Cross => 'x',
        }
    }
}

impl TimeInForce {
    pub fn from_token(token: &str) -> Option<Self> {
        match single_char(token)? {
            '0' => Some(Self::Day),
            '1' => Some(Self::GoodTillCancel),
            '2' => Some(Self::AtTheOpening),
            '3' => Some(Self::ImmediateOrCancel),
            '4' => Some(Self::FillOrKill),
            '5' => Some(Self::GoodTillCrossing),
            '6' => Some(Self::GoodTillDate),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Day => '0',
            Self::GoodTillCancel => '1',
            Self::AtTheOpening => '2',
            Self::ImmediateOrCancel => '3',
            Self::FillOrKill => '4',
            Self::GoodTillCrossing => '5',
            Self::GoodTillDate => '6',
        }
    }
}

impl ExecTransType {
    pub fn from_token(token: &str) -> Option<Self> {
        match single_char(token)? {
            '0' => Some(Self::New),
            '1' => Some(Self::Cancel),
            '2' => Some(Self::Correct),
            '3' => Some(Self::Status),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::New => '0',
            Self::Cancel => '1',
            Self::Correct => '2',
            Self::Status => '3',
        }
    }
}
