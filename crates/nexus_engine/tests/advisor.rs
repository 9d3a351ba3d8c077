use nexus_engine::{
    suggest_or_default, AdvisorError, OfflineAdvisor, SelectorAdvisor, SelectorPrediction,
    Strategy,
};
use pretty_assertions::assert_eq;

struct FailingAdvisor;

#[async_trait::async_trait]
impl SelectorAdvisor for FailingAdvisor {
    async fn suggest(&self, _html: &str, _url: &str) -> Result<SelectorPrediction, AdvisorError> {
        Err(AdvisorError::Unavailable("no api key".to_string()))
    }
}

struct OverconfidentAdvisor;

#[async_trait::async_trait]
impl SelectorAdvisor for OverconfidentAdvisor {
    async fn suggest(&self, html: &str, _url: &str) -> Result<SelectorPrediction, AdvisorError> {
        Ok(SelectorPrediction {
            container: format!("len-{}", html.chars().count()),
            confidence: 3.0,
            ..SelectorPrediction::fallback()
        })
    }
}

#[tokio::test]
async fn failures_fall_back_to_defaults() {
    nexus_logging::initialize_for_tests();
    let prediction = suggest_or_default(&FailingAdvisor, "<html/>", "https://x.example").await;
    assert_eq!(prediction, SelectorPrediction::fallback());
    assert_eq!(prediction.strategy_recommendation, Strategy::Dynamic);
}

#[tokio::test]
async fn offline_advisor_returns_static_guess() {
    let prediction = suggest_or_default(&OfflineAdvisor, "<html/>", "https://x.example").await;
    assert_eq!(prediction.container, ".product-card");
    assert_eq!(prediction.strategy_recommendation, Strategy::Static);
    assert_eq!(prediction.confidence, 0.85);
}

#[tokio::test]
async fn samples_are_truncated_and_confidence_clamped() {
    let html = "a".repeat(60_000);
    let prediction = suggest_or_default(&OverconfidentAdvisor, &html, "https://x.example").await;
    assert_eq!(prediction.container, "len-50000");
    assert_eq!(prediction.confidence, 1.0);
}
