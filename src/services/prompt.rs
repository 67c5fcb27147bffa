use chrono::{Duration, NaiveDate};

use crate::{
    config::Config,
    database::models::coupon,
    services::formatting::{format_percentage, format_usd, title_case},
};

const DATE_FORMAT: &str = "%m-%d-%Y";

/// Business values substituted into agent prompts.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub company_name: String,
    pub website_url: String,
    pub today: NaiveDate,
}

impl PromptContext {
    pub fn from_config(config: &Config) -> Self {
        let today = chrono::Utc::now()
            .with_timezone(&config.business_timezone())
            .date_naive();
        Self {
            company_name: config.company_name.clone(),
            website_url: config.website_url.clone(),
            today,
        }
    }
}

/// "15%" when a percentage is set, otherwise the amount as USD.
pub fn format_discount(coupon: Option<&coupon::Model>) -> String {
    match coupon {
        Some(coupon) if coupon.discount_percentage > 0.0 => {
            format_percentage(coupon.discount_percentage)
        }
        Some(coupon) => format_usd(coupon.discount_amount),
        None => format_usd(0.0),
    }
}

pub fn substitute(prompt: &str, coupon: Option<&coupon::Model>, ctx: &PromptContext) -> String {
    let ending = (ctx.today + Duration::weeks(1)).format(DATE_FORMAT).to_string();
    prompt
        .replace("[COMPANY_NAME]", &ctx.company_name)
        .replace("[DISCOUNT]", &format_discount(coupon))
        .replace("[COUPON_CODE]", coupon.map(|c| c.code.as_str()).unwrap_or(""))
        .replace("[WEBSITE_URL]", &ctx.website_url)
        .replace("[DISCOUNT_ENDING]", &ending)
}

/// Agent prompt with placeholders filled and a fenced "User Details" block appended.
pub fn system_prompt(
    agent_prompt: &str,
    coupon: Option<&coupon::Model>,
    name: &str,
    vehicle: Option<&str>,
    ctx: &PromptContext,
) -> String {
    let mut details = vec![format!("name: {}", title_case(name))];
    if let Some(vehicle) = vehicle {
        details.push(format!("vehicle: {}", vehicle));
    }
    if let Some(coupon) = coupon {
        details.push(format!("coupon_code: {}", coupon.code));
    }
    details.push(format!("discount: {}", format_discount(coupon)));

    format!(
        "{}\nUser Details:\n```\n{}\n```",
        substitute(agent_prompt, coupon, ctx),
        details.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn coupon(amount: f64, percentage: f64) -> coupon::Model {
        coupon::Model {
            id: 1,
            code: "SAVE10".into(),
            description: "".into(),
            discount_amount: amount,
            discount_percentage: percentage,
            start_at: Utc::now(),
            end_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ctx() -> PromptContext {
        PromptContext {
            company_name: "BU Mobile Detailing".into(),
            website_url: "https://www.bumobiledetailing.com".into(),
            today: NaiveDate::from_ymd_opt(2024, 12, 28).unwrap(),
        }
    }

    #[test]
    fn placeholders_are_replaced() {
        let prompt = "[COMPANY_NAME] gives [DISCOUNT] with [COUPON_CODE] at [WEBSITE_URL] until [DISCOUNT_ENDING]";
        let out = substitute(prompt, Some(&coupon(0.0, 15.0)), &ctx());
        assert_eq!(
            out,
            "BU Mobile Detailing gives 15% with SAVE10 at https://www.bumobiledetailing.com until 01-04-2025"
        );
    }

    #[test]
    fn amount_discount_is_currency() {
        assert_eq!(format_discount(Some(&coupon(25.0, 0.0))), "$25.00");
        assert_eq!(format_discount(None), "$0.00");
    }

    #[test]
    fn system_prompt_appends_user_details() {
        let out = system_prompt("Hello", Some(&coupon(25.0, 0.0)), "jane", None, &ctx());
        assert!(out.starts_with("Hello\nUser Details:\n```\n"));
        assert!(out.contains("name: Jane"));
        assert!(out.contains("discount: $25.00"));
        assert!(out.ends_with("```"));
    }
}
