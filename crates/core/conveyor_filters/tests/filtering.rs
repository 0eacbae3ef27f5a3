use assert_matches::assert_matches;
use async_trait::async_trait;
use conveyor_api::streams;
use conveyor_api::Message;
use conveyor_api::MessageBuilder;
use conveyor_api::Pipeline;
use conveyor_api::ProcessingError;
use conveyor_api::Processor;
use conveyor_filters::FilterPredicate;
use conveyor_filters::FilteringStage;
use conveyor_filters::PredicateFn;
use futures::StreamExt;
use futures::TryStreamExt;
use serde_json::json;

/// Accept messages with `x == 1`, stamping every inspected message
fn x_is_one() -> impl FilterPredicate {
    PredicateFn::new(|message: &Message, builder: &mut MessageBuilder| {
        builder.set_property("inspected", true);
        message.property("x") == Some(&json!(1))
    })
}

fn msg(id: &str, x: i64) -> Message {
    Message::new(id, "{}").with_property("x", x)
}

/// Append a property to each message flowing through
struct Stamp {
    property: &'static str,
}

#[async_trait]
impl Processor for Stamp {
    fn name(&self) -> &str {
        "Stamp"
    }

    async fn process(&self, message: Message) -> Result<Option<Message>, ProcessingError> {
        let mut builder = message.builder();
        builder.set_property(self.property, true);
        Ok(Some(builder.build()))
    }
}

/// Fail on every message
struct Broken;

#[async_trait]
impl Processor for Broken {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn process(&self, message: Message) -> Result<Option<Message>, ProcessingError> {
        Err(ProcessingError::messaging(
            self.name(),
            message,
            std::io::Error::other("target out of order"),
        ))
    }
}

#[derive(thiserror::Error, Debug)]
#[error("not UTF-8")]
struct NotUtf8;

/// Accept UTF-8 payloads containing "ok"; fail on any non UTF-8 payload
struct Utf8Contains;

impl FilterPredicate for Utf8Contains {
    type Error = NotUtf8;

    fn accept(&self, message: &Message, builder: &mut MessageBuilder) -> Result<bool, NotUtf8> {
        builder.set_property("inspected", true);
        let payload = message.payload_str().ok_or(NotUtf8)?;
        Ok(payload.contains("ok"))
    }
}

#[tokio::test]
async fn accepted_messages_are_forwarded_mutated_to_the_next_processor() {
    let stage = FilteringStage::new("filter", x_is_one()).with_next(Stamp { property: "routed" });

    let output = stage.process(msg("m-1", 1)).await.unwrap().unwrap();

    // the next processor received the builder-mutated snapshot, and its own
    // result is what the stage returns
    assert_eq!(output.property("inspected"), Some(&json!(true)));
    assert_eq!(output.property("routed"), Some(&json!(true)));
}

#[tokio::test]
async fn accepted_messages_are_spliced_with_the_next_processor_output() {
    let stage = FilteringStage::new("filter", x_is_one()).with_next(Stamp { property: "routed" });

    let output: Vec<Message> = stage
        .apply(streams::all(vec![msg("m-1", 1)]))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].property("inspected"), Some(&json!(true)));
    assert_eq!(output[0].property("routed"), Some(&json!(true)));
}

#[tokio::test]
async fn without_next_processor_accepted_messages_pass_through() {
    let stage = FilteringStage::new("filter", x_is_one());

    let output = stage.process(msg("m-1", 1)).await.unwrap().unwrap();

    assert_eq!(output.correlation_id(), "m-1");
    assert_eq!(output.property("inspected"), Some(&json!(true)));
}

#[tokio::test]
async fn rejected_messages_go_to_the_redirect_target_whatever_the_raise_flag() {
    let stage = FilteringStage::new("filter", x_is_one())
        .with_next(Stamp { property: "routed" })
        .with_unaccepted_processor(Stamp {
            property: "rejected",
        })
        .with_throw_on_unaccepted(true);

    let output = stage.process(msg("m-1", 0)).await.unwrap().unwrap();

    // the redirect target received the builder-mutated snapshot; the next
    // processor was never involved
    assert_eq!(output.property("inspected"), Some(&json!(true)));
    assert_eq!(output.property("rejected"), Some(&json!(true)));
    assert_eq!(output.property("routed"), None);
}

#[tokio::test]
async fn rejected_messages_are_spliced_with_the_redirect_target_output() {
    let stage = FilteringStage::new("filter", x_is_one()).with_unaccepted_processor(Stamp {
        property: "rejected",
    });

    let output: Vec<Message> = stage
        .apply(streams::all(vec![msg("m-1", 0), msg("m-2", 1)]))
        .try_collect()
        .await
        .unwrap();

    let rejected: Vec<_> = output
        .iter()
        .map(|m| m.property("rejected").is_some())
        .collect();
    assert_eq!(rejected, vec![true, false]);
}

#[tokio::test]
async fn redirect_target_errors_propagate_unchanged() {
    let stage = FilteringStage::new("filter", x_is_one()).with_unaccepted_processor(Broken);

    let error = stage.process(msg("m-1", 0)).await.unwrap_err();

    // attributed to the redirect target, not re-wrapped by the stage
    assert_matches!(error, ProcessingError::Messaging { processor, .. } if processor == "Broken");
}

#[tokio::test]
async fn rejected_messages_raise_when_configured_to_throw() {
    let stage = FilteringStage::new("filter", x_is_one()).with_throw_on_unaccepted(true);

    let error = stage.process(msg("m-1", 0)).await.unwrap_err();

    assert_matches!(error, ProcessingError::MessageRejected);
}

#[tokio::test]
async fn a_rejection_error_ends_the_stream() {
    let stage = FilteringStage::new("filter", x_is_one()).with_throw_on_unaccepted(true);

    let output: Vec<_> = stage
        .apply(streams::all(vec![msg("m-1", 1), msg("m-2", 0), msg("m-3", 1)]))
        .collect()
        .await;

    // the error takes the place of the rejected element and nothing follows
    assert_eq!(output.len(), 2);
    assert_matches!(&output[0], Ok(message) if message.correlation_id() == "m-1");
    assert_matches!(&output[1], Err(ProcessingError::MessageRejected));
}

#[tokio::test]
async fn rejected_messages_are_dropped_by_default() {
    let stage = FilteringStage::new("filter", x_is_one());

    let output = stage.process(msg("m-1", 0)).await.unwrap();

    assert_eq!(output, None);
}

#[tokio::test]
async fn a_dropped_message_does_not_end_the_stream() {
    let stage = FilteringStage::new("filter", x_is_one());

    let output: Vec<Message> = stage
        .apply(streams::all(vec![msg("m-1", 1), msg("m-2", 0), msg("m-3", 1)]))
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<_> = output.iter().map(Message::correlation_id).collect();
    assert_eq!(ids, vec!["m-1", "m-3"]);
}

#[tokio::test]
async fn a_predicate_failure_is_not_a_rejection() {
    let stage = FilteringStage::new("filter", Utf8Contains).with_unaccepted_processor(Stamp {
        property: "rejected",
    });

    let error = stage
        .process(Message::new("m-1", vec![0x80, 0x81]))
        .await
        .unwrap_err();

    // neither dropped nor redirected: the failure surfaces, carrying the
    // snapshot as mutated by the predicate before it gave up
    assert_matches!(&error, ProcessingError::Messaging { processor, .. } if processor == "filter");
    let carried = error.message().unwrap();
    assert_eq!(carried.property("inspected"), Some(&json!(true)));
    assert_eq!(carried.property("rejected"), None);
}

#[tokio::test]
async fn a_predicate_failure_ends_the_stream() {
    let stage = FilteringStage::new("filter", Utf8Contains);

    let output: Vec<_> = stage
        .apply(streams::all(vec![
            Message::new("m-1", "ok"),
            Message::new("m-2", vec![0x80, 0x81]),
            Message::new("m-3", "ok"),
        ]))
        .collect()
        .await;

    assert_eq!(output.len(), 2);
    assert_matches!(&output[0], Ok(message) if message.correlation_id() == "m-1");
    assert_matches!(&output[1], Err(ProcessingError::Messaging { processor, .. }) if processor == "filter");
}

#[tokio::test]
async fn a_filtering_stage_within_a_pipeline() {
    let pipeline = Pipeline::new("main")
        .then(FilteringStage::new("filter", x_is_one()))
        .then(Stamp { property: "routed" });

    let kept = pipeline.process(msg("m-1", 1)).await.unwrap().unwrap();
    assert_eq!(kept.property("routed"), Some(&json!(true)));

    let dropped = pipeline.process(msg("m-2", 0)).await.unwrap();
    assert_eq!(dropped, None);
}

#[tokio::test]
async fn redirecting_to_a_fallback_pipeline() {
    let fallback = Pipeline::new("fallback").then(Stamp {
        property: "rejected",
    });
    let stage = FilteringStage::new("filter", x_is_one()).with_unaccepted_pipeline(fallback);
    assert!(stage.redirects_to_pipeline());

    let output = stage.process(msg("m-1", 0)).await.unwrap().unwrap();

    assert_eq!(output.property("rejected"), Some(&json!(true)));
}
