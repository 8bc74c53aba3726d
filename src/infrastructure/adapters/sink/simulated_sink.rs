//! Simulated Sink - 时钟驱动的音频输出端
//!
//! 不解码音频，只按配置的片段时长推进播放位置并上报事件。
//! 用于无界面运行与集成测试。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    AudioSinkPort, LoadGeneration, MediaSource, SinkError, SinkEvent, SubscriptionId,
};

/// 模拟输出端配置
#[derive(Debug, Clone)]
pub struct SimulatedSinkConfig {
    /// 时钟间隔
    pub tick: Duration,
    /// 每个音源的模拟时长（秒）
    pub segment_secs: f64,
}

impl Default for SimulatedSinkConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            segment_secs: 30.0,
        }
    }
}

#[derive(Default)]
struct ClockState {
    generation: LoadGeneration,
    loaded: bool,
    playing: bool,
    position: f64,
    duration: f64,
    rate: f64,
    volume: f64,
    listeners: Vec<(SubscriptionId, mpsc::UnboundedSender<SinkEvent>)>,
}

impl ClockState {
    fn emit(&self, event: SinkEvent) {
        for (_, listener) in &self.listeners {
            let _ = listener.send(event.clone());
        }
    }
}

/// 模拟输出端
pub struct SimulatedSink {
    state: Arc<Mutex<ClockState>>,
    config: SimulatedSinkConfig,
    clock: Option<CancellationToken>,
}

impl SimulatedSink {
    pub fn new(config: SimulatedSinkConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                rate: 1.0,
                volume: 1.0,
                ..Default::default()
            })),
            config,
            clock: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        lock_state(&self.state)
    }

    fn stop_clock(&mut self) {
        if let Some(token) = self.clock.take() {
            token.cancel();
        }
    }

    fn start_clock(&mut self, generation: LoadGeneration) {
        let token = CancellationToken::new();
        self.clock = Some(token.clone());

        let state = self.state.clone();
        let tick = self.config.tick;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(tick) => {}
                }
                if !advance(&state, generation, tick.as_secs_f64()) {
                    break;
                }
            }
            token.cancel();
        });
    }

    fn validate(source: &MediaSource) -> Result<(), SinkError> {
        match source {
            MediaSource::Url(url) if url.trim().is_empty() => {
                Err(SinkError::Unsupported("empty url".to_string()))
            }
            MediaSource::Resource(handle) if handle.is_released() => {
                Err(SinkError::Released(handle.segment_id().to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn lock_state(state: &Mutex<ClockState>) -> MutexGuard<'_, ClockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// 推进一拍，返回时钟是否继续
fn advance(state: &Mutex<ClockState>, generation: LoadGeneration, elapsed: f64) -> bool {
    let mut state = lock_state(state);
    if state.generation != generation || !state.loaded {
        return false;
    }
    if !state.playing {
        return true;
    }

    state.position = (state.position + elapsed * state.rate).min(state.duration);
    state.emit(SinkEvent::PositionTick {
        generation,
        position: state.position,
    });

    if state.position >= state.duration {
        state.playing = false;
        state.emit(SinkEvent::Ended { generation });
        return false;
    }
    true
}

impl AudioSinkPort for SimulatedSink {
    fn load(&mut self, source: MediaSource, generation: LoadGeneration) {
        self.stop_clock();

        let validated = Self::validate(&source);
        {
            let mut state = self.lock();
            state.generation = generation;
            state.playing = false;
            state.position = 0.0;
            state.duration = 0.0;
            state.loaded = validated.is_ok();

            if let Err(error) = validated {
                tracing::warn!(url = %source.url(), error = %error, "Simulated sink rejected source");
                state.emit(SinkEvent::LoadFailed { generation, error });
                return;
            }

            state.duration = self.config.segment_secs;
            state.emit(SinkEvent::DurationKnown {
                generation,
                duration: state.duration,
            });
        }

        tracing::debug!(
            url = %source.url(),
            cached = source.is_cached(),
            generation = generation,
            "Simulated sink loaded source"
        );
        self.start_clock(generation);
    }

    fn play(&mut self) {
        let generation = {
            let mut state = self.lock();
            if !state.loaded || state.position >= state.duration {
                return;
            }
            state.playing = true;
            state.generation
        };

        // 播放结束后时钟已停止，重新播放时需要重启
        if self.clock.as_ref().map_or(true, CancellationToken::is_cancelled) {
            self.start_clock(generation);
        }
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn seek(&mut self, position: f64) {
        let mut state = self.lock();
        state.position = position;
        if state.loaded {
            let generation = state.generation;
            state.emit(SinkEvent::PositionTick { generation, position });
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.lock().rate = rate;
    }

    fn set_volume(&mut self, volume: f64) {
        self.lock().volume = volume;
    }

    fn detach(&mut self) {
        self.stop_clock();
        let mut state = self.lock();
        state.loaded = false;
        state.playing = false;
        state.position = 0.0;
        state.duration = 0.0;
    }

    fn subscribe(&mut self, listener: mpsc::UnboundedSender<SinkEvent>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.lock().listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _)| *existing != id);
        state.listeners.len() != before
    }
}

impl Drop for SimulatedSink {
    fn drop(&mut self) {
        self.stop_clock();
    }
}
