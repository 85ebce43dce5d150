use tera::Context;

use oidc_frontend_core::adapter::{ConsentContext, ConsentRenderer};

use crate::TEMPLATES;

/// Renders the consent form from `static/pages/consent.html`.
#[derive(Debug)]
pub struct TeraConsent;

impl ConsentRenderer for TeraConsent {
    fn render(&self, consent: &ConsentContext) -> anyhow::Result<String> {
        let mut context = Context::new();
        context.insert("client_id", consent.client_id.as_str());
        context.insert("client_name", &consent.client_name);
        context.insert("subject", &consent.subject);
        context.insert("action", consent.action.as_str());
        context.insert("parameters", &consent.parameters);
        Ok(TEMPLATES.render("consent.html", &context)?)
    }
}
