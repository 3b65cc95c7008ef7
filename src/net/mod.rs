//! # 带复位弧的安全 Petri 网
//!
//! 设库所集合 `P` 与迁移集合 `T`。每个迁移 `t` 有前集 `•t`、后集 `t•`
//! 以及复位集 `R(t)`：`t` 发生时消耗 `•t` 中的令牌，清空 `R(t)` 中的库所，
//! 再向 `t•` 产生令牌。展开引擎按 `•t ∪ R(t)` 为每个库所挑选一个条件。
//!
//! ## 示例
//!
//! ```rust
//! use pn_unfold::net::*;
//!
//! let mut net = Net::empty();
//! let p0 = net.add_place(Place::new("p0", 1)).unwrap();
//! let p1 = net.add_place(Place::new("p1", 0)).unwrap();
//! let t0 = net.add_transition(Transition::new("t0")).unwrap();
//!
//! net.add_input_arc(p0, t0);
//! net.add_output_arc(p1, t0);
//! net.add_reset_arc(p1, t0);
//!
//! assert_eq!(net.transition(t0).prereset().collect::<Vec<_>>(), vec![p0, p1]);
//! assert_eq!(net.max_prereset(), 2);
//! ```

pub mod core;
pub mod ids;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use core::{DiagnosticReport, Net, NetError};
pub use ids::{PlaceId, TransitionId};
pub use index_vec::{Idx, IndexVec};
pub use io::{IoError, NetDescription, read_net};
pub use structure::{NodeList, Place, Transition};
