// crates/gs_safety/src/driver/observer.rs

//! 逐步观察者
//!
//! 驱动器每完成一步就向所有观察者广播一条 [`TickRecord`]。

use std::sync::Arc;

use serde::Serialize;

use gs_config::ScenarioKind;

use crate::certifier::{CertificationResult, Verdict};
use crate::state::{Disturbance, GridState};
use crate::uncertainty::UncertaintySet;

/// 单步记录
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickRecord<'a> {
    /// 场景
    pub scenario: ScenarioKind,
    /// 认证前的状态
    pub state: &'a GridState,
    /// 使用的不确定性集合
    pub set: &'a UncertaintySet,
    /// 认证结果
    pub result: &'a CertificationResult,
    /// 实际扰动
    pub realized: &'a Disturbance,
    /// 实际扰动是否落在集合内
    pub covered: bool,
    /// 推进后的状态
    pub next_state: &'a GridState,
    /// 推进后状态中越界的屏障数
    pub violations: usize,
    /// 更新后的校准因子
    pub calibration_factor: f64,
}

/// 逐步观察者 trait
pub trait TickObserver: Send + Sync {
    /// 处理单步记录
    fn on_tick(&self, record: &TickRecord<'_>);

    /// 获取观察者名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式观察者
pub struct FnObserver<F>
where
    F: Fn(&TickRecord<'_>) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&TickRecord<'_>) + Send + Sync,
{
    /// 创建函数式观察者
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> TickObserver for FnObserver<F>
where
    F: Fn(&TickRecord<'_>) + Send + Sync,
{
    fn on_tick(&self, record: &TickRecord<'_>) {
        (self.handler)(record);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志观察者：默认只记录干预步
pub struct LoggingObserver {
    prefix: String,
    verbose: bool,
}

impl LoggingObserver {
    /// 创建日志观察者
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// 每一步都记录
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl TickObserver for LoggingObserver {
    fn on_tick(&self, record: &TickRecord<'_>) {
        let result = record.result;
        let msg = match result.verdict {
            Verdict::Safe | Verdict::Unfiltered if !self.verbose => return,
            Verdict::Safe | Verdict::Unfiltered => format!(
                "tick {} {}, min slack {:.4}",
                result.tick,
                result.verdict,
                result.min_slack()
            ),
            Verdict::Corrected => format!(
                "tick {} CORRECTED: ({:.2}, {:.2}) -> ({:.2}, {:.2}) kW",
                result.tick,
                result.original.battery_kw(),
                result.original.shed_kw(),
                result.certified.battery_kw(),
                result.certified.shed_kw()
            ),
            Verdict::Infeasible => format!(
                "tick {} INFEASIBLE, fail-safe ({:.2}, {:.2}) kW",
                result.tick,
                result.certified.battery_kw(),
                result.certified.shed_kw()
            ),
        };
        tracing::info!("{} [{}]: {}", self.prefix, record.scenario.key(), msg);
    }

    fn name(&self) -> &str {
        "LoggingObserver"
    }
}

/// 观察者列表
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn TickObserver>>,
}

impl ObserverSet {
    /// 添加观察者
    pub fn add(&mut self, observer: Arc<dyn TickObserver>) {
        tracing::debug!("添加观察者: {}", observer.name());
        self.observers.push(observer);
    }

    /// 广播
    pub fn emit(&self, record: &TickRecord<'_>) {
        for observer in &self.observers {
            observer.on_tick(record);
        }
    }

    /// 观察者数量
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}
