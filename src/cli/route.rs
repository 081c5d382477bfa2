use anyhow::Result;

use crate::backends::build_backends;
use crate::cascades::{TierRouter, classify_task, classify_with_policy};
use crate::{AppConfig, console};

pub fn handle_classify(prompt: &str, legacy: bool, json: bool, config: &AppConfig) -> Result<()> {
    let router_config = config.router_config();

    if legacy {
        let decision = classify_task(prompt, router_config.legacy_max_local_prompt_length);
        if json {
            console().plain(&serde_json::to_string_pretty(&decision)?);
        } else {
            console().decision(&decision.tier.to_string(), decision.confidence, &decision.reason);
        }
        return Ok(());
    }

    let decision = classify_with_policy(
        prompt,
        router_config.max_local_prompt_length,
        router_config.routing_policy,
    );
    if json {
        console().plain(&serde_json::to_string_pretty(&decision)?);
    } else {
        console().decision(&decision.tier.to_string(), decision.confidence, &decision.reason);
        console().verbose(&format!("Prompt length: {} chars", decision.prompt_length));
    }
    Ok(())
}

pub async fn handle_route(prompt: &str, legacy: bool, json: bool, config: &AppConfig) -> Result<()> {
    let router = TierRouter::from_config(config.router_config())?;

    if legacy {
        let result = router.route(prompt).await;
        if json {
            console().plain(&serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        let decision = &result.decision;
        console().decision(&decision.tier.to_string(), decision.confidence, &decision.reason);
        match result.response {
            Some(ref response) => console().plain(response),
            None => console().defer_to_quality(),
        }
        return Ok(());
    }

    let result = router.route_three_tier(prompt).await;
    if json {
        console().plain(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let decision = &result.decision;
    console().decision(&decision.tier.to_string(), decision.confidence, &decision.reason);
    for attempt in &result.attempts {
        console().fallback(attempt.tier, &attempt.failure);
    }

    match result.response {
        Some(ref response) => {
            console().plain(response);
            if let Some(ref cost) = result.cost {
                console().verbose(&format!(
                    "{} via {} in {}ms, {} + {} tokens, ${:.6}",
                    cost.tier(),
                    cost.model(),
                    cost.duration_ms(),
                    cost.prompt_tokens(),
                    cost.completion_tokens(),
                    cost.cost_usd()
                ));
            }
        }
        None => console().defer_to_quality(),
    }
    Ok(())
}

pub async fn handle_health(config: &AppConfig) -> Result<()> {
    let (local, cheap) = build_backends(&config.router_config())?;

    for backend in [local, cheap] {
        let available = backend.is_available().await;
        console().health(backend.backend_name(), backend.model_name(), available);
    }
    Ok(())
}
