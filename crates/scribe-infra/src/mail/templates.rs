//! Built-in HTML bodies for account mail.

/// Which account mail to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    Confirmation,
    ResetPassword,
}

impl MailTemplate {
    pub fn subject(&self) -> &'static str {
        match self {
            MailTemplate::Confirmation => "Please confirm your account",
            MailTemplate::ResetPassword => "Reset your password",
        }
    }

    /// Client-side route the link points at.
    pub fn path(&self) -> &'static str {
        match self {
            MailTemplate::Confirmation => "confirm",
            MailTemplate::ResetPassword => "restore-password",
        }
    }

    pub fn link(&self, client_url: &str, token: &str) -> String {
        format!(
            "{}/{}?token={}",
            client_url.trim_end_matches('/'),
            self.path(),
            token
        )
    }

    pub fn render(&self, url: &str) -> String {
        let (heading, action) = match self {
            MailTemplate::Confirmation => (
                "Welcome!",
                "Follow the link below to confirm your account.",
            ),
            MailTemplate::ResetPassword => (
                "Password reset",
                "Follow the link below to choose a new password.",
            ),
        };

        format!(
            "<!DOCTYPE html>\n<html>\n<body>\n\
             <h1>{heading}</h1>\n\
             <p>{action}</p>\n\
             <p><a href=\"{url}\">{url}</a></p>\n\
             </body>\n</html>\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_point_at_client_routes() {
        assert_eq!(
            MailTemplate::Confirmation.link("http://localhost:3000/", "abc"),
            "http://localhost:3000/confirm?token=abc"
        );
        assert_eq!(
            MailTemplate::ResetPassword.link("http://localhost:3000", "abc"),
            "http://localhost:3000/restore-password?token=abc"
        );
    }

    #[test]
    fn body_embeds_the_link() {
        let html = MailTemplate::ResetPassword.render("http://x/restore-password?token=t");
        assert!(html.contains("href=\"http://x/restore-password?token=t\""));
    }
}
