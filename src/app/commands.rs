//! Invocation selectors.
//!
//! The procedures take positional text arguments.  Each is parsed once into
//! a closed enum; anything unrecognised is rejected before any hardware is
//! touched.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// Number of pour channels (0..=5).
pub const POUR_CHANNEL_COUNT: usize = 6;

/// One of the six pour servos, wired to PCA9685 channels 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServoChannel(u8);

impl ServoChannel {
    pub const ALL: [ServoChannel; POUR_CHANNEL_COUNT] = [
        ServoChannel(0),
        ServoChannel(1),
        ServoChannel(2),
        ServoChannel(3),
        ServoChannel(4),
        ServoChannel(5),
    ];

    /// `None` for indices outside 0..=5.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < POUR_CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Which actuator a cycle run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSelector {
    /// A numbered pour servo; runs the requested number of cycles.
    Channel(ServoChannel),
    /// The mixing actuator; always exactly one cycle.
    Mix,
}

impl FromStr for ChannelSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mix" => Ok(Self::Mix),
            "0" | "1" | "2" | "3" | "4" | "5" => {
                let index = s.as_bytes()[0] - b'0';
                ServoChannel::new(index)
                    .map(Self::Channel)
                    .ok_or_else(|| Error::UnknownChannel(s.to_owned()))
            }
            _ => Err(Error::UnknownChannel(s.to_owned())),
        }
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(ch) => write!(f, "{}", ch.index()),
            Self::Mix => write!(f, "mix"),
        }
    }
}

/// Parse a repeat count.  Only non-negative integers are accepted.
pub fn parse_count(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| Error::InvalidCount(s.to_owned()))
}

/// What the tag reader polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderMode {
    /// MFRC522: request, authenticate, read the user block.
    Uid,
    /// PN532 on I2C: raw frame read.
    Payment,
}

impl FromStr for ReaderMode {
    type Err = Error;

    /// The mixer service passes the mode as a textual boolean, so
    /// `false`/`true` are accepted next to `0`/`1`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" | "uid" | "false" => Ok(Self::Uid),
            "1" | "payment" | "true" => Ok(Self::Payment),
            _ => Err(Error::UnknownMode(s.to_owned())),
        }
    }
}

/// A parsed `actuator-cycle` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRequest {
    pub selector: ChannelSelector,
    /// Ignored for [`ChannelSelector::Mix`].
    pub count: u32,
}

impl CycleRequest {
    /// Parse `<channel> [count]`.  The count may be omitted only for `mix`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let selector: ChannelSelector = args
            .first()
            .ok_or(Error::MissingArgument("channel"))?
            .as_ref()
            .parse()?;
        let count = match (selector, args.get(1)) {
            (ChannelSelector::Mix, _) => 1,
            (ChannelSelector::Channel(_), Some(c)) => parse_count(c.as_ref())?,
            (ChannelSelector::Channel(_), None) => return Err(Error::MissingArgument("count")),
        };
        Ok(Self { selector, count })
    }
}

/// Parse `<mode>` for the tag reader.
pub fn mode_from_args<S: AsRef<str>>(args: &[S]) -> Result<ReaderMode> {
    args.first()
        .ok_or(Error::MissingArgument("mode"))?
        .as_ref()
        .parse()
}
