//! Workshop confirmation email content
//!
//! Every value taken from a registration is HTML-escaped before it is placed
//! in the HTML part.

use chrono::Utc;
use html_escape::encode_text;
use nawa_common::db::{Friend, WorkshopRegistration};

/// A rendered message, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub const SUBJECT: &str = "Your Nawa workshop registration";

pub fn render_workshop_confirmation(registration: &WorkshopRegistration) -> RenderedEmail {
    RenderedEmail {
        subject: SUBJECT.to_string(),
        html: render_html(registration),
        text: render_text(registration),
    }
}

fn render_html(registration: &WorkshopRegistration) -> String {
    let friends: String = registration
        .friends()
        .map(|friend| format!("<li>{}</li>", encode_text(&friend_line(friend))))
        .collect();
    let friends_section = if friends.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p style="margin:16px 0 4px">You are bringing:</p><ul style="margin:0;padding-left:20px">{}</ul>"#,
            friends
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{subject}</title></head>
<body style="margin:0;padding:0;background:#f4f1ec;font-family:Helvetica,Arial,sans-serif;color:#2b2b2b">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0">
<tr><td align="center" style="padding:32px 16px">
<table role="presentation" width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px">
<tr><td style="padding:32px">
<h1 style="margin:0 0 16px;font-size:22px">Thank you, {name}!</h1>
<p style="margin:0 0 16px">Your place at the workshop is registered. Here is what we received:</p>
<table role="presentation" cellpadding="4" cellspacing="0" style="font-size:15px">
<tr><td><strong>Bundle</strong></td><td>{bundle}</td></tr>
<tr><td><strong>Payment</strong></td><td>{payment}</td></tr>
<tr><td><strong>Email</strong></td><td>{email}</td></tr>
<tr><td><strong>Phone</strong></td><td>{phone}</td></tr>
</table>
{friends}
<p style="margin:24px 0 0">We will be in touch with the final details before the workshop.</p>
</td></tr>
</table>
</td></tr>
</table>
</body>
</html>
"#,
        subject = SUBJECT,
        name = encode_text(&registration.name),
        bundle = encode_text(registration.bundle_label()),
        payment = encode_text(registration.payment_label()),
        email = encode_text(&registration.email),
        phone = encode_text(&registration.phone),
        friends = friends_section,
    )
}

fn render_text(registration: &WorkshopRegistration) -> String {
    let mut text = format!(
        "Thank you, {}!\n\n\
         Your place at the workshop is registered. Here is what we received:\n\n\
         Bundle:  {}\n\
         Payment: {}\n\
         Email:   {}\n\
         Phone:   {}\n",
        registration.name,
        registration.bundle_label(),
        registration.payment_label(),
        registration.email,
        registration.phone,
    );

    let friends: Vec<String> = registration.friends().map(friend_line).collect();
    if !friends.is_empty() {
        text.push_str("\nYou are bringing:\n");
        for line in friends {
            text.push_str(&format!("  - {}\n", line));
        }
    }

    text.push_str("\nWe will be in touch with the final details before the workshop.\n");
    text
}

fn friend_line(friend: &Friend) -> String {
    let contact: Vec<&str> = [friend.email.as_deref(), friend.phone.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if contact.is_empty() {
        friend.name.clone()
    } else {
        format!("{} ({})", friend.name, contact.join(", "))
    }
}

/// Registration used by the preview endpoint
pub fn sample_registration() -> WorkshopRegistration {
    WorkshopRegistration {
        id: 0,
        name: "Alex Example".to_string(),
        email: "alex@example.com".to_string(),
        phone: "+49 30 1234567".to_string(),
        payment: "online".to_string(),
        bundle: "89".to_string(),
        friend1: None,
        friend2: None,
        created_at: Utc::now(),
    }
}

/// Placeholder friend for previews
pub fn sample_friend(n: u8) -> Friend {
    Friend {
        name: format!("Friend {}", n),
        email: Some(format!("friend{}@example.com", n)),
        phone: None,
    }
}
