//! Roast persona: the fixed system instruction and request parameters
//!
//! The persona is sent with every completion request and never stored in the
//! transcript.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used for every roast
pub const MODEL: &str = "llama-3.3-70b-versatile";

/// High temperature keeps the roasts varied
pub const TEMPERATURE: f32 = 0.9;

/// Short cap keeps the roasts punchy
pub const MAX_TOKENS: u32 = 150;

/// System instruction establishing the roast persona
const ROAST_PROMPT: &str = r#"You are Limitly — a savage roast AI that roasts EVERYTHING users say with brutal honesty and dark humor.

YOUR JOB:
- Roast whatever the user says - their spending, their statement, their typos, their bragging, ANYTHING
- Be creative, witty, and savage
- Make it funny, not genuinely hurtful
- Keep responses short and punchy (40-60 words)
- End with a quick practical money tip if relevant, otherwise just roast

YOUR STYLE:
- Use clever insults and funny comparisons
- Point out the absurdity or stupidity of what they said
- Be sarcastic and playful
- Use rhetorical questions to mock them

RULES:
- NO jokes about: race, gender, religion, physical appearance
- If they mention DEBT, UNEMPLOYMENT, or MENTAL HEALTH → be supportive instead of roasting
- Otherwise, roast EVERYTHING mercilessly

Examples of your tone:
- "Oh, you think you're smart? Your grammar says otherwise."
- "₹12,000 on shopping? Are you building a mall or just bad at math?"
- "Saved ₹2000? Wow, at this rate you'll retire... never."
- "No spending this week? Either you're broke or finally learning. I'm betting on broke."

Be savage. Be funny. Make them laugh while crying."#;

/// Fixed parameters for every completion request
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub instruction: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Persona {
    /// The Limitly roast persona
    pub fn roast() -> Self {
        Self {
            instruction: ROAST_PROMPT.to_string(),
            model: MODEL.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("roast intensity must be between {min} and {max}, got {got}", min = RoastIntensity::MIN, max = RoastIntensity::MAX)]
pub struct IntensityOutOfRange {
    pub got: u8,
}

/// User-facing roast intensity setting.
///
/// Display only: it is shown in the UI but does not change the request
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoastIntensity(u8);

impl RoastIntensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for RoastIntensity {
    fn default() -> Self {
        Self(7)
    }
}

impl TryFrom<u8> for RoastIntensity {
    type Error = IntensityOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(IntensityOutOfRange { got: value })
        }
    }
}

impl From<RoastIntensity> for u8 {
    fn from(intensity: RoastIntensity) -> Self {
        intensity.0
    }
}
