//! I/O 支持：以 JSON、RON 或 TOML 描述的网。
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::core::{Net, NetError};
use crate::net::ids::PlaceId;
use crate::net::structure::{Place, Transition};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid net: {0}")]
    Net(#[from] NetError),
    #[error("unsupported net file extension `{0}` (expected json, ron or toml)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    #[serde(default)]
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub name: String,
    #[serde(default)]
    pub preset: Vec<String>,
    #[serde(default)]
    pub postset: Vec<String>,
    #[serde(default)]
    pub reset: Vec<String>,
}

/// Serializable form of a [`Net`]: places by name, arcs by place names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDescription {
    #[serde(default)]
    pub places: Vec<PlaceDescription>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
}

impl NetDescription {
    pub fn into_net(self) -> Result<Net, NetError> {
        if self.places.is_empty() {
            return Err(NetError::Empty);
        }

        let mut net = Net::empty();
        for place in self.places {
            net.add_place(Place::new(place.name, u32::from(place.marked)))?;
        }

        for desc in self.transitions {
            let resolve = |name: &String| {
                net.place_by_name(name)
                    .ok_or_else(|| NetError::UnknownPlace {
                        transition: desc.name.clone(),
                        place: name.clone(),
                    })
            };
            let preset = desc.preset.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
            let postset = desc.postset.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
            let reset = desc.reset.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;

            let t = net.add_transition(Transition::new(desc.name.clone()))?;
            for p in preset {
                net.add_input_arc(p, t);
            }
            for p in postset {
                net.add_output_arc(p, t);
            }
            for p in reset {
                net.add_reset_arc(p, t);
            }
        }
        Ok(net)
    }

    pub fn from_net(net: &Net) -> Self {
        let names = |places: &[PlaceId]| {
            places
                .iter()
                .map(|p| net.place(*p).name.clone())
                .collect::<Vec<_>>()
        };
        Self {
            places: net
                .places
                .iter()
                .map(|p| PlaceDescription {
                    name: p.name.clone(),
                    marked: p.is_marked(),
                })
                .collect(),
            transitions: net
                .transitions
                .iter()
                .map(|t| TransitionDescription {
                    name: t.name.clone(),
                    preset: names(t.preset.as_slice()),
                    postset: names(t.postset.as_slice()),
                    reset: names(t.reset.as_slice()),
                })
                .collect(),
        }
    }
}

pub fn from_json_str(s: &str) -> Result<Net, IoError> {
    let desc: NetDescription = serde_json::from_str(s)?;
    Ok(desc.into_net()?)
}

pub fn from_ron_str(s: &str) -> Result<Net, IoError> {
    let desc: NetDescription = ron::from_str(s)?;
    Ok(desc.into_net()?)
}

pub fn from_toml_str(s: &str) -> Result<Net, IoError> {
    let desc: NetDescription = toml::from_str(s)?;
    Ok(desc.into_net()?)
}

pub fn to_json_string(net: &Net) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(&NetDescription::from_net(net))?)
}

/// Reads a net, picking the format from the file extension.
pub fn read_net<P: AsRef<Path>>(path: P) -> Result<Net, IoError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let content = fs::read_to_string(path)?;
    match extension.as_str() {
        "json" => from_json_str(&content),
        "ron" => from_ron_str(&content),
        "toml" => from_toml_str(&content),
        other => Err(IoError::UnknownFormat(other.to_string())),
    }
}
