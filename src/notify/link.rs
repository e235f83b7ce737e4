//! WhatsApp deep links

use crate::config::WebFallback;

/// A message addressed to one number, rendered as native and web links
#[derive(Debug, Clone, PartialEq)]
pub struct WhatsAppLink {
    phone: String,
    encoded_text: String,
}

impl WhatsAppLink {
    /// `phone` must already be normalized to digits
    pub fn new(phone: &str, text: &str) -> Self {
        Self {
            phone: phone.to_string(),
            encoded_text: urlencoding::encode(text).into_owned(),
        }
    }

    /// `whatsapp://send?...`, opened by the installed app
    pub fn native(&self) -> String {
        format!(
            "whatsapp://send?phone={}&text={}",
            self.phone, self.encoded_text
        )
    }

    pub fn web(&self, fallback: WebFallback) -> String {
        match fallback {
            WebFallback::ApiWhatsapp => format!(
                "https://api.whatsapp.com/send?phone={}&text={}",
                self.phone, self.encoded_text
            ),
            WebFallback::WaMe => format!("https://wa.me/{}?text={}", self.phone, self.encoded_text),
        }
    }
}
