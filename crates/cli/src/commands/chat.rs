//! `onboarding-buddy chat` — Terminal chat session.
//!
//! Walks the same gates as the web surface: password, then the details form,
//! then the chat loop. `/back` returns to the form, `exit` or `quit` leaves.

use buddy_agent::OnboardingBuddy;
use buddy_config::AppConfig;
use buddy_session::{PasswordGate, SessionContext};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const FIELDS: [&str; 3] = ["Name", "Unit", "Division"];

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load_with_override(config_path)?;
    let secrets = config.require_secrets()?;
    config.require_source_document()?;

    let provider = buddy_providers::build_from_config(&config, &secrets.api_key);
    let buddy = OnboardingBuddy::from_config(&config, provider)?;
    let gate = PasswordGate::new(&secrets.access_password);

    println!("╔══════════════════════════════════════════╗");
    println!("║  Onboarding Buddy — Induction Assistant  ║");
    println!("╚══════════════════════════════════════════╝");
    println!("Model: {}\n", config.generation.model);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut console = Console::new(stdin.lines(), std::io::stdout(), &config.persona.assistant_name);
    console.run(&buddy, &gate).await
}

enum ChatExit {
    Back,
    Quit,
}

/// Line-oriented driver over any input and output.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
    assistant_name: String,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(lines: Lines<R>, out: W, assistant_name: &str) -> Self {
        Self {
            lines,
            out,
            assistant_name: assistant_name.to_string(),
        }
    }

    /// Run one session until the input ends or the user quits.
    pub async fn run(&mut self, buddy: &OnboardingBuddy, gate: &PasswordGate) -> CliResult<()> {
        let mut session = SessionContext::new();

        loop {
            let Some(attempt) = self.prompt("Password: ").await? else {
                return Ok(());
            };
            match session.password_check(gate, &attempt) {
                Ok(()) => break,
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }

        loop {
            if !self.details_form(&mut session).await? {
                return Ok(());
            }
            match self.chat(buddy, &mut session).await? {
                ChatExit::Back => continue,
                ChatExit::Quit => {
                    writeln!(self.out, "Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    async fn prompt(&mut self, label: &str) -> CliResult<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Fill and submit the details form. Returns `false` when input ends.
    async fn details_form(&mut self, session: &mut SessionContext) -> CliResult<bool> {
        'form: loop {
            writeln!(
                self.out,
                "\nPlease enter your details. Enter keeps the value shown, /clear empties the form."
            )?;
            let profile = &session.profile;
            let mut values = [
                profile.name.clone(),
                profile.unit.clone(),
                profile.division.clone(),
            ];

            for (label, value) in FIELDS.iter().zip(values.iter_mut()) {
                let Some(input) = self.prompt(&format!("{label} [{value}]: ")).await? else {
                    return Ok(false);
                };
                match input.trim() {
                    "/clear" => {
                        session.detail_clear()?;
                        writeln!(self.out, "Form cleared.")?;
                        continue 'form;
                    }
                    "" => {}
                    entered => *value = entered.to_string(),
                }
            }

            let [name, unit, division] = values;
            session.set_profile(name, unit, division)?;
            match session.detail_check() {
                Ok(()) => return Ok(true),
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
    }

    async fn chat(
        &mut self,
        buddy: &OnboardingBuddy,
        session: &mut SessionContext,
    ) -> CliResult<ChatExit> {
        writeln!(
            self.out,
            "\nHi {}! I'm {}. Ask me anything about joining the division.",
            session.profile.name, self.assistant_name
        )?;
        writeln!(self.out, "Type /back to edit your details, 'exit' to quit.\n")?;

        loop {
            let Some(line) = self.prompt("You > ").await? else {
                return Ok(ChatExit::Quit);
            };
            let question = line.trim();
            match question {
                "" => continue,
                "exit" | "quit" => return Ok(ChatExit::Quit),
                "/back" => {
                    session.detail_reset();
                    return Ok(ChatExit::Back);
                }
                _ => {}
            }

            match buddy.ask(session, question).await {
                Ok(outcome) => {
                    for notice in &outcome.notices {
                        writeln!(self.out, "  ⚠️  {notice}")?;
                    }
                    writeln!(self.out, "{} > {}\n", self.assistant_name, outcome.reply)?;
                }
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
    }
}
