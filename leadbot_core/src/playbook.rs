//! Purpose catalog and reply copy.
//!
//! The playbook is loaded once at startup and shared read-only by every
//! conversation. Substituting it (another language, another set of
//! purposes) never touches the state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::text::normalize_text;

/// Placeholder replaced by the contact's display name in the greeting.
const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybookError {
    #[error("playbook has no purposes")]
    NoPurposes,

    #[error("purpose code {0:?} is empty or not normalized (trimmed, lowercase)")]
    InvalidCode(String),

    #[error("purpose code {0:?} is declared more than once")]
    DuplicateCode(String),

    #[error("purpose {0:?} has an empty label or follow-up")]
    MissingCopy(String),
}

/// One entry of the purpose catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeOption {
    /// Menu code the contact types, compared after normalization.
    pub code: String,
    /// Human-readable label stored in the session.
    pub label: String,
    /// Prefix shown in front of the label in the main menu.
    #[serde(default)]
    pub bullet: String,
    /// Prompt asking for details relevant to this purpose.
    pub follow_up: String,
}

impl PurposeOption {
    fn new(code: &str, bullet: &str, label: &str, follow_up: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            bullet: bullet.to_string(),
            follow_up: follow_up.join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playbook {
    /// Greeting used when the display name is known; `{name}` is substituted.
    pub greeting_named: String,
    pub greeting_anonymous: String,
    pub intro: Vec<String>,
    pub purposes: Vec<PurposeOption>,
    pub menu_instruction: String,
    pub invalid_option: String,
    pub closing: String,
    pub session_closed: String,
}

impl Default for Playbook {
    fn default() -> Self {
        Self {
            greeting_named: "Olá, {name}! 👋".to_string(),
            greeting_anonymous: "Olá! 👋".to_string(),
            intro: vec![
                "Obrigado por entrar em contato com a nossa equipe.".to_string(),
                "Para agilizar seu atendimento, selecione uma opção:".to_string(),
            ],
            purposes: vec![
                PurposeOption::new(
                    "1",
                    "1️⃣",
                    "Projeto em andamento",
                    &[
                        "Perfeito! Vamos tratar do seu projeto em andamento. 🏗️",
                        "Por favor, envie o número do projeto e um resumo da sua dúvida para priorizarmos o atendimento.",
                    ],
                ),
                PurposeOption::new(
                    "2",
                    "2️⃣",
                    "Agendar reunião",
                    &[
                        "Ótimo! Vamos organizar sua reunião. 📅",
                        "Informe, por favor, seu melhor dia/horário e o assunto principal da reunião.",
                    ],
                ),
                PurposeOption::new(
                    "3",
                    "3️⃣",
                    "Solicitar orçamento",
                    &[
                        "Excelente! Vamos iniciar seu orçamento. 💰",
                        "Descreva brevemente o escopo do projeto e a cidade/estado de execução.",
                    ],
                ),
            ],
            menu_instruction: "Responda com *1*, *2* ou *3*.".to_string(),
            invalid_option: "Opção inválida. Envie *1*, *2* ou *3* para continuar.".to_string(),
            closing: [
                "Recebido! ✅",
                "Nossa triagem foi concluída e já encaminhamos as informações.",
                "Por favor, aguarde o contato do nosso engenheiro responsável.",
                "",
                "Se quiser reiniciar o atendimento, envie *menu*.",
            ]
            .join("\n"),
            session_closed: "Se quiser iniciar um novo atendimento, envie *menu*.".to_string(),
        }
    }
}

impl Playbook {
    /// Look up a purpose by its (normalized) menu code. Exact match only.
    #[must_use]
    pub fn purpose(&self, code: &str) -> Option<&PurposeOption> {
        self.purposes.iter().find(|p| p.code == code)
    }

    /// Reply sent once `code` is chosen from the menu.
    #[must_use]
    pub fn follow_up(&self, code: &str) -> Option<&str> {
        self.purpose(code).map(|p| p.follow_up.as_str())
    }

    /// Greeting, intro, numbered options and reply instruction.
    #[must_use]
    pub fn main_menu(&self, display_name: &str) -> String {
        let display_name = display_name.trim();
        let greeting = if display_name.is_empty() {
            self.greeting_anonymous.clone()
        } else {
            self.greeting_named.replace(NAME_PLACEHOLDER, display_name)
        };

        let mut lines = Vec::with_capacity(self.intro.len() + self.purposes.len() + 4);
        lines.push(greeting);
        lines.extend(self.intro.iter().cloned());
        lines.push(String::new());
        lines.extend(self.purposes.iter().map(|p| {
            if p.bullet.is_empty() {
                p.label.clone()
            } else {
                format!("{} {}", p.bullet, p.label)
            }
        }));
        lines.push(String::new());
        lines.push(self.menu_instruction.clone());
        lines.join("\n")
    }

    /// Reject catalogs the state machine cannot serve deterministically.
    pub fn validate(&self) -> Result<(), PlaybookError> {
        if self.purposes.is_empty() {
            return Err(PlaybookError::NoPurposes);
        }

        let mut seen = HashSet::new();
        for purpose in &self.purposes {
            if purpose.code.is_empty() || normalize_text(&purpose.code) != purpose.code {
                return Err(PlaybookError::InvalidCode(purpose.code.clone()));
            }
            if !seen.insert(purpose.code.as_str()) {
                return Err(PlaybookError::DuplicateCode(purpose.code.clone()));
            }
            if purpose.label.trim().is_empty() || purpose.follow_up.trim().is_empty() {
                return Err(PlaybookError::MissingCopy(purpose.code.clone()));
            }
        }
        Ok(())
    }
}
