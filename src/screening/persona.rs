//! Interviewer personas.
//!
//! A persona fixes the tone of the screening: its system instruction and its
//! opening line. Which model serves a persona is configuration, see
//! [`crate::utilities::config::ScreeningConfig`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utilities::errors::ConfigError;

const LANI_PROMPT: &str = r#"
You are Lani, a balanced, professional female Hiring Assistant for "TalentScout".
Your goal is to conduct a standard, polite screening interview.

Ask ONE question at a time. Do not ask them as a big list.
1. Full Name
2. Email Address
3. Phone Number
4. Years of Experience
5. Desired Position(s)
6. Current Location
7. Tech Stack

Once gathered, generate 3-5 technical questions based on their Tech Stack. Wait for their answers.
Conclude gracefully. Stop if the user says exit.
"#;

const MALIK_PROMPT: &str = r#"
You are Malik, an explanative, straight-to-the-point male Hiring Manager for "TalentScout".
Your goal is to screen candidates efficiently. Be highly direct and professional. Do not use emojis. Keep pleasantries to a minimum.

Ask ONLY one question at a time. Do not ask for everything at once.
1. Start by asking for their Full Name.
2. Ask for Email Address.
3. Ask for Phone Number.
4. Ask for Years of Experience.
5. Ask for Desired Position(s).
6. Ask for Current Location.
7. Ask for their Tech Stack.

Once all the above is gathered, generate 3 to 5 highly specific technical questions based on their Tech Stack. Wait for them to answer.
Conclude the conversation directly and inform them of next steps. Stop if the user says exit.
"#;

const CLARA_PROMPT: &str = r#"
You are Clara, a chatty, warm, but highly knowledgeable female Hiring Assistant for "TalentScout".
Your goal is to make the candidate feel extremely welcome and comfortable while screening them. Feel free to use appropriate emojis 😊.

Ask ONLY one question at a time. Do not overwhelm them.
1. Ask for their Full Name warmly.
2. Ask for their Email Address.
3. Ask for their Phone Number.
4. Ask for their Years of Experience.
5. Ask for their Desired Position(s).
6. Ask for their Current Location.
7. Ask for their Tech Stack.

Once all the above is gathered, generate 3 to 5 thoughtful technical questions based directly on their Tech Stack. Wait for their answers.
Conclude the conversation cheerfully. Stop if the user says exit.
"#;

/// Interviewer persona selected by the candidate before the screening starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Persona {
    /// Balanced and polite. Used when no persona is chosen.
    #[default]
    Lani,
    /// Direct, no pleasantries.
    Malik,
    /// Chatty and warm.
    Clara,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Lani, Persona::Malik, Persona::Clara];

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Lani => "Lani",
            Persona::Malik => "Malik",
            Persona::Clara => "Clara",
        }
    }

    /// Short style tag shown next to the name in persona pickers.
    pub fn style(&self) -> &'static str {
        match self {
            Persona::Lani => "Balanced",
            Persona::Malik => "Direct",
            Persona::Clara => "Chatty",
        }
    }

    /// The instruction injected as the system message on every call.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Lani => LANI_PROMPT,
            Persona::Malik => MALIK_PROMPT,
            Persona::Clara => CLARA_PROMPT,
        }
    }

    /// Opening line recorded as the first assistant message.
    pub fn greeting(&self) -> &'static str {
        match self {
            Persona::Lani => {
                "Hello. I am Lani, your hiring assistant for TalentScout. Let's begin the screening. Please provide your Full Name."
            }
            Persona::Malik => {
                "I'm Malik, Hiring Manager at TalentScout. We're going to keep this highly efficient. Let's start with your Full Name."
            }
            Persona::Clara => {
                "Hi there! 😊 I'm Clara, your hiring assistant today! I'm so excited to learn more about you. To get us started, could you share your Full Name with me?"
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Persona::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownPersona(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("malik".parse::<Persona>().unwrap(), Persona::Malik);
        assert_eq!(" CLARA ".parse::<Persona>().unwrap(), Persona::Clara);
        assert!(matches!(
            "Bob".parse::<Persona>(),
            Err(ConfigError::UnknownPersona(name)) if name == "Bob"
        ));
    }

    #[test]
    fn test_default_is_lani() {
        assert_eq!(Persona::default(), Persona::Lani);
    }

    #[test]
    fn test_prompts_name_their_persona() {
        for persona in Persona::ALL {
            assert!(persona.system_prompt().contains(persona.name()));
            assert!(persona.greeting().contains(persona.name()));
            assert!(persona.system_prompt().contains("Tech Stack"));
        }
    }

    #[test]
    fn test_malik_avoids_emojis() {
        assert!(Persona::Malik.system_prompt().contains("Do not use emojis"));
        assert!(Persona::Malik.greeting().is_ascii());
    }
}
