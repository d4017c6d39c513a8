use crate::config::ContactConfig;
use crate::contact::request::Submission;
use crate::mailer::OutboundEmail;

/// Subject used when the submitter left theirs blank
const DEFAULT_SUBJECT: &str = "New contact message";

/// Escape a user-supplied string for embedding in the HTML body.
///
/// The ampersand substitution must run first or the later entities get
/// double-escaped.
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Render a validated submission into a provider-agnostic message.
///
/// Pure transformation: HTML rendering escapes every user field, the
/// plain-text rendering keeps them raw. The subject is prefixed with the
/// submitter's name so it survives provider-side From rewriting.
pub fn compose(submission: &Submission, contact: &ContactConfig) -> OutboundEmail {
    let base_subject = match submission.subject.as_deref() {
        Some(s) if !s.trim().is_empty() => s,
        _ => DEFAULT_SUBJECT,
    };
    let subject = format!("{} — {}", submission.name, base_subject);

    let heading = submission.subject.as_deref().unwrap_or("Message");

    let mut html = format!(
        "<div style=\"font-family:Inter,Segoe UI,Roboto,Arial,sans-serif;line-height:1.5;color:#0f2137\">\n\
         <h2 style=\"margin:0 0 12px\">{}</h2>\n\
         <p style=\"margin:0 0 8px\"><strong>Name:</strong> {}</p>\n\
         <p style=\"margin:0 0 8px\"><strong>Email:</strong> {}</p>\n",
        html_escape(heading),
        html_escape(&submission.name),
        html_escape(&submission.email),
    );
    if let Some(s) = &submission.subject {
        html.push_str(&format!(
            "<p style=\"margin:0 0 8px\"><strong>Subject:</strong> {}</p>\n",
            html_escape(s)
        ));
    }
    html.push_str(&format!(
        "<p style=\"margin:12px 0 6px\"><strong>Message</strong></p>\n\
         <pre style=\"white-space:pre-wrap;background:#f6f8fc;padding:12px;border-radius:8px;border:1px solid #e6edf7\">{}</pre>\n\
         </div>",
        html_escape(&submission.message),
    ));

    let text = format!(
        "{}\n\nName: {}\nEmail: {}\n{}{}",
        heading,
        submission.name,
        submission.email,
        match &submission.subject {
            Some(s) => format!("Subject: {s}\n\n"),
            None => "\n".to_string(),
        },
        submission.message,
    );

    OutboundEmail {
        to: contact.to.clone(),
        subject,
        html,
        text,
        submitter_name: submission.name.clone(),
        submitter_email: submission.email.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactConfig {
        ContactConfig {
            to: "owner@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            from_name: "Contact Form".to_string(),
        }
    }

    fn submission(subject: Option<&str>) -> Submission {
        Submission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: subject.map(str::to_string),
            message: "line one\nline two".to_string(),
        }
    }

    #[test]
    fn escape_order_keeps_ampersand_first() {
        assert_eq!(html_escape("<b>&'\""), "&lt;b&gt;&amp;&#039;&quot;");
        // A pre-escaped entity must not be double-escaped differently
        // than its raw form.
        assert_eq!(html_escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn markup_in_fields_never_reaches_the_html() {
        let mut sub = submission(None);
        sub.name = "<b>&'\"".to_string();

        let email = compose(&sub, &contact());
        assert!(email.html.contains("&lt;b&gt;&amp;&#039;&quot;"));
        assert!(!email.html.contains("<b>"));
    }

    #[test]
    fn subject_is_prefixed_with_the_submitter_name() {
        let email = compose(&submission(Some("Hello")), &contact());
        assert_eq!(email.subject, "Ada — Hello");
    }

    #[test]
    fn blank_subject_falls_back_to_the_default() {
        let email = compose(&submission(None), &contact());
        assert_eq!(email.subject, format!("Ada — {DEFAULT_SUBJECT}"));

        let email = compose(&submission(Some("   ")), &contact());
        assert_eq!(email.subject, format!("Ada — {DEFAULT_SUBJECT}"));
    }

    #[test]
    fn subject_line_is_included_only_when_present() {
        let with = compose(&submission(Some("Hello")), &contact());
        assert!(with.html.contains("<strong>Subject:</strong> Hello"));
        assert!(with.text.contains("Subject: Hello\n\n"));

        let without = compose(&submission(None), &contact());
        assert!(!without.html.contains("<strong>Subject:</strong>"));
        assert!(!without.text.contains("Subject:"));
    }

    #[test]
    fn message_sits_in_a_preformatted_block() {
        let email = compose(&submission(None), &contact());
        assert!(email.html.contains("<pre"));
        assert!(email.html.contains("white-space:pre-wrap"));
        assert!(email.html.contains("line one\nline two"));
    }

    #[test]
    fn plain_text_body_is_not_escaped() {
        let mut sub = submission(None);
        sub.message = "<b>raw & unescaped</b>".to_string();

        let email = compose(&sub, &contact());
        assert!(email.text.contains("<b>raw & unescaped</b>"));
        assert!(email.text.starts_with("Message\n\nName: Ada\nEmail: ada@example.com\n\n"));
    }

    #[test]
    fn destination_and_submitter_carry_through() {
        let email = compose(&submission(None), &contact());
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.submitter_name, "Ada");
        assert_eq!(email.submitter_email, "ada@example.com");
    }
}
