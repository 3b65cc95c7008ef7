//! # 展开（Unfolding）
//!
//! 展开是网的所有并发运行的偏序表示。条件是库所上令牌的一次出现，
//! 事件是迁移的一次发生。核心是可能扩展（PE）的发现与调度：
//!
//! * [`ConflictChecker`] 判断一组条件能否在同一次运行中共存；
//! * [`CombinationEnumerator`] 为一个迁移回溯枚举两两并发的输入条件组合；
//! * [`PeQueue`] 按局部配置大小排序待处理的扩展；
//! * [`ExtensionEngine`] 对每个新条件驱动上述三者。
//!
//! [`Unfolder`] 在此之上完成“弹出、提交、扩展”的循环，[`mci`] 将结果写成
//! 下游工具使用的二进制记录。
//!
//! ```rust
//! use pn_unfold::net::{Net, Place, Transition};
//! use pn_unfold::unfold::{UnfoldSettings, Unfolder};
//!
//! let mut net = Net::empty();
//! let a = net.add_place(Place::new("A", 1)).unwrap();
//! let b = net.add_place(Place::new("B", 1)).unwrap();
//! let t = net.add_transition(Transition::new("T")).unwrap();
//! net.add_input_arc(a, t);
//! net.add_input_arc(b, t);
//!
//! let result = Unfolder::new(&net, UnfoldSettings::default()).run();
//! assert_eq!(result.stats.events, 1);
//! assert_eq!(result.unfolding.event(pn_unfold::unfold::EventId::new(0)).preset.len(), 2);
//! ```

pub mod combination;
pub mod conflict;
pub mod driver;
pub mod epoch;
pub mod extension;
pub mod mci;
pub mod model;
pub mod queue;

pub use combination::CombinationEnumerator;
pub use conflict::ConflictChecker;
pub use driver::{StopReason, UnfoldResult, UnfoldSettings, UnfoldStats, Unfolder};
pub use epoch::EpochMarks;
pub use extension::{EngineConfig, EngineStats, ExtensionEngine};
pub use mci::{MciError, MciFile, read_mci, write_mci};
pub use model::{Condition, ConditionId, Event, EventId, Unfolding};
pub use queue::{InsertOutcome, PeQueue, PeQueueEntry, PossibleExtension};
