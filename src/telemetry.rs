use std::{str::FromStr, sync::Once};

use tracing::{dispatcher::set_global_default, level_filters::LevelFilter, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

/// 여러 레이어들을 하나의 `tracing` subscriber로 구성한다.
///
/// # 구현 노트
///
/// `impl Subscriber`를 반환 타입으로 사용해서 반환된 subscriber의 실제 타입을 숨긴다.
/// 나중에 `init_tracing_subscriber`로 전달하기 위해 `Send`이고 `Sync`임을 명시한다.
pub fn get_tracing_subscriber<Sink>(
    env_filter: LevelFilter,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    // higher-ranked trait bound: 모든 라이프타임 `'a`에 대해 `MakeWriter`를 구현한다.
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // RUST_LOG 환경 변수가 없으면 주어진 레벨 이상만 출력한다.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(
        EnvFilter::from_str("tower_http=debug,axum::rejection=trace")
            .unwrap_or_default()
            .add_directive(env_filter.into()),
    );

    let formatting_layer = BunyanFormattingLayer::new("merchant_backoffice".into(), sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// subscriber를 글로벌 기본값으로 등록한다.
/// 한차례만 실행된다.
pub fn init_tracing_subscriber(tracing_subscriber: impl Subscriber + Send + Sync) {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        set_global_default(tracing_subscriber.into()).expect("Failed to set subscriber.");
        LogTracer::builder().init().expect("Failed to set logger.");
    })
}
