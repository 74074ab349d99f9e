//! Contact-email disclosure.
//!
//! The page hides the contact address behind an acknowledgment button. The
//! flag starts unrevealed; the button reveals it and there is no control to
//! hide it again. [`Disclosure::toggle`] is the underlying symmetric flip,
//! [`Disclosure::acknowledge`] the one-way user action.
//!
//! The unrevealed markup never contains the literal address. The button
//! carries it reversed in `data-reveal`; the page script restores it on click.

use maud::{Markup, html};

/// Visible text of the acknowledgment control.
pub const ACKNOWLEDGE_LABEL: &str = "I understand.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disclosure {
    revealed: bool,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn toggle(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Handle a click on the acknowledgment control.
    pub fn acknowledge(&mut self) {
        if !self.revealed {
            self.toggle();
        }
    }

    pub fn render(&self, email: &str) -> Markup {
        if self.revealed {
            html! { (email) }
        } else {
            html! {
                button.contact-reveal type="button" data-reveal=(reverse(email)) {
                    (ACKNOWLEDGE_LABEL)
                }
            }
        }
    }
}

fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "richard.habeeb@yale.edu";

    #[test]
    fn starts_unrevealed_with_control() {
        let d = Disclosure::new();
        let html = d.render(EMAIL).into_string();
        assert!(!d.is_revealed());
        assert!(html.contains("<button"));
        assert!(html.contains(ACKNOWLEDGE_LABEL));
        assert!(!html.contains(EMAIL));
    }

    #[test]
    fn control_carries_reversed_address() {
        let html = Disclosure::new().render(EMAIL).into_string();
        assert!(html.contains(r#"data-reveal="ude.elay@beebah.drahcir""#));
    }

    #[test]
    fn acknowledge_renders_literal_email() {
        let mut d = Disclosure::new();
        d.acknowledge();
        assert_eq!(d.render(EMAIL).into_string(), EMAIL);
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let mut d = Disclosure::new();
        d.acknowledge();
        d.acknowledge();
        assert!(d.is_revealed());
        assert_eq!(d.render(EMAIL).into_string(), EMAIL);
    }

    #[test]
    fn toggle_is_symmetric() {
        let mut d = Disclosure::new();
        d.toggle();
        assert!(d.is_revealed());
        d.toggle();
        assert!(!d.is_revealed());
    }

    #[test]
    fn reversal_keeps_astral_characters_whole() {
        let email = "me\u{1F600}@example.org";
        let html = Disclosure::new().render(email).into_string();
        let reversed = "gro.elpmaxe@\u{1F600}em";
        assert!(html.contains(&format!(r#"data-reveal="{reversed}""#)));
        assert_eq!(reversed.chars().rev().collect::<String>(), email);
    }

    #[test]
    fn revealed_email_is_escaped() {
        let mut d = Disclosure::new();
        d.acknowledge();
        let html = d.render("a<b>@c").into_string();
        assert_eq!(html, "a&lt;b&gt;@c");
    }
}
