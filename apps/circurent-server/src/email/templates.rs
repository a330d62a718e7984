//! Email templates for verification.

/// Content for verification emails.
pub struct VerificationEmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl VerificationEmailContent {
    /// Create verification email content with the given code.
    pub fn new(code: &str) -> Self {
        Self {
            subject: "Verify your email address - CircuRent".to_string(),
            text: Self::text_template(code),
            html: Self::html_template(code),
        }
    }

    fn text_template(code: &str) -> String {
        format!(
            r#"Welcome to CircuRent!

Thank you for registering. To complete your registration, please verify
your email address using the code below.

Your verification code is: {}

This code will expire in 10 minutes.

If you didn't request this verification code, please ignore this email.
Your account will remain secure.

--
CircuRent
This is an automated email, please do not reply."#,
            code
        )
    }

    fn html_template(code: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif; line-height: 1.6; color: #1a1a1a; margin: 0; padding: 0; background: #0a0a0f; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 40px 20px; }}
        .card {{ background: white; border-radius: 16px; padding: 40px; overflow: hidden; }}
        .logo {{ font-size: 32px; font-weight: 900; color: #84cc16; margin: 0 0 24px; }}
        h1 {{ color: #0a0a0f; margin-top: 0; font-size: 24px; }}
        .code {{ font-size: 40px; font-weight: 900; letter-spacing: 10px; color: #84cc16; text-align: center; padding: 28px; background: #0a0a0f; border-radius: 12px; margin: 28px 0; font-family: 'Courier New', monospace; }}
        .expires {{ background: #fff8e1; border-left: 4px solid #ffc107; padding: 14px 18px; border-radius: 8px; color: #5d4037; font-size: 14px; }}
        .footer {{ margin-top: 32px; padding-top: 20px; border-top: 1px solid #e0e0e0; color: #9e9e9e; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <p class="logo">CircuRent</p>
            <h1>Welcome to CircuRent!</h1>
            <p>Thank you for registering! To complete your registration and start renting items, please verify your email address using the code below.</p>
            <div class="code">{}</div>
            <p class="expires"><strong>Important:</strong> This verification code will expire in <strong>10 minutes</strong>. Please use it promptly.</p>
            <div class="footer">
                <p>If you didn't request this verification code, please ignore this email. Your account will remain secure.</p>
                <p>This is an automated email, please do not reply.</p>
            </div>
        </div>
    </div>
</body>
</html>"#,
            code
        )
    }
}
