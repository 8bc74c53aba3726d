//! Transport Controller - 唯一音频输出端的控制器
//!
//! 持有输出端及其事件订阅；位置与时长只通过输出端事件更新。

use tokio::sync::mpsc;

use crate::application::ports::{
    AudioSinkPort, LoadGeneration, MediaSource, ResourceHandle, SinkError, SinkEvent,
    SubscriptionId,
};
use crate::domain::playback::progress_percent;

/// 默认快进 / 快退步长（秒）
pub const DEFAULT_SKIP_SECS: f64 = 10.0;

/// 快进 / 快退的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// 在当前片段内完成跳转
    InPlace,
    /// 需要切到下一个片段
    NextSegment,
    /// 需要切到上一个片段
    PreviousSegment,
}

/// 输出端事件经过过滤后的信号
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// 时长或位置更新
    PositionChanged,
    /// 当前音源播放结束
    Ended,
    /// 当前音源加载失败
    LoadFailed(SinkError),
}

/// 传输控制器
pub struct TransportController {
    sink: Box<dyn AudioSinkPort>,
    subscription: Option<SubscriptionId>,
    generation: LoadGeneration,
    has_source: bool,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    speed: f64,
    volume: f64,
    skip_secs: f64,
}

impl TransportController {
    /// 创建控制器并订阅输出端事件
    pub fn new(
        mut sink: Box<dyn AudioSinkPort>,
        events: mpsc::UnboundedSender<SinkEvent>,
        speed: f64,
        volume: f64,
        skip_secs: f64,
    ) -> Self {
        let subscription = sink.subscribe(events);
        sink.set_rate(speed);
        sink.set_volume(volume);
        Self {
            sink,
            subscription: Some(subscription),
            generation: 0,
            has_source: false,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            speed,
            volume,
            skip_secs,
        }
    }

    /// 从网络地址加载音源，不自动播放
    pub fn set_source(&mut self, url: &str) {
        tracing::debug!(url = %url, "Transport set source");
        self.load(MediaSource::Url(url.to_string()));
    }

    /// 挂载缓存中已预加载的资源，不自动播放
    pub fn attach(&mut self, handle: ResourceHandle) {
        tracing::debug!(segment_id = %handle.segment_id(), "Transport attach cached resource");
        self.load(MediaSource::Resource(handle));
    }

    // 先重置位置 / 时长，再开始加载新音源
    fn load(&mut self, source: MediaSource) {
        self.generation += 1;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.is_playing = false;
        self.sink.load(source, self.generation);
        self.sink.set_rate(self.speed);
        self.has_source = true;
    }

    /// 开始播放；没有音源时忽略
    pub fn play(&mut self) {
        if !self.has_source {
            tracing::debug!("Play ignored: no source");
            return;
        }
        self.sink.play();
        self.is_playing = true;
    }

    /// 暂停；播放位置保持为最后一次上报的值
    pub fn pause(&mut self) {
        self.sink.pause();
        self.is_playing = false;
    }

    /// 暂停并回到开头
    pub fn stop(&mut self) {
        self.sink.pause();
        self.sink.seek(0.0);
        self.is_playing = false;
        self.current_time = 0.0;
    }

    /// 跳转到指定位置，不做范围裁剪
    pub fn seek_to(&mut self, time: f64) {
        self.sink.seek(time);
        self.current_time = time;
    }

    pub fn set_speed(&mut self, rate: f64) {
        self.sink.set_rate(rate);
        self.speed = rate;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.sink.set_volume(volume);
        self.volume = volume;
    }

    /// 快进；超出当前片段时交给调用方切换片段
    pub fn skip_forward(&mut self) -> SkipOutcome {
        let target = self.current_time + self.skip_secs;
        if target < self.duration {
            self.seek_to(target);
            SkipOutcome::InPlace
        } else {
            SkipOutcome::NextSegment
        }
    }

    /// 快退；退到开头之前时交给调用方切换片段
    pub fn skip_backward(&mut self) -> SkipOutcome {
        let target = self.current_time - self.skip_secs;
        if target > 0.0 {
            self.seek_to(target);
            SkipOutcome::InPlace
        } else {
            SkipOutcome::PreviousSegment
        }
    }

    /// 处理输出端事件，旧代音源的事件被丢弃
    pub fn handle_event(&mut self, event: SinkEvent) -> Option<TransportSignal> {
        if event.generation() != self.generation || !self.has_source {
            tracing::trace!(
                event_generation = event.generation(),
                current_generation = self.generation,
                "Stale sink event dropped"
            );
            return None;
        }

        match event {
            SinkEvent::DurationKnown { duration, .. } => {
                self.duration = duration;
                Some(TransportSignal::PositionChanged)
            }
            SinkEvent::PositionTick { position, .. } => {
                self.current_time = position;
                Some(TransportSignal::PositionChanged)
            }
            SinkEvent::Ended { .. } => {
                self.is_playing = false;
                Some(TransportSignal::Ended)
            }
            SinkEvent::LoadFailed { error, .. } => {
                tracing::warn!(generation = self.generation, error = %error, "Sink failed to load source");
                Some(TransportSignal::LoadFailed(error))
            }
        }
    }

    /// 卸载音源（输出端不再绑定任何片段）
    pub fn unload(&mut self) {
        self.generation += 1;
        self.sink.detach();
        self.has_source = false;
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    /// 退订事件并卸载音源
    pub fn teardown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.sink.unsubscribe(id);
        }
        self.unload();
    }

    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn has_source(&self) -> bool {
        self.has_source
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn progress(&self) -> f64 {
        progress_percent(self.current_time, self.duration)
    }
}
