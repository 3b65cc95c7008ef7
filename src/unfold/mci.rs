//! MCI 二进制格式：供下游可视化工具读取的展开记录。
//!
//! Layout, all integers little-endian `i32`, ids 1-based with 0 as "none":
//!
//! ```text
//! #conditions #events
//! cut records ... 0
//! per event:      transition 0
//! per condition:  place tokens 0 producer consumer... 0
//! harmful events ... 0
//! cutoff pairs ... 0
//! 0
//! #places #transitions max-name-length
//! place names (NUL-terminated) NUL
//! transition names (NUL-terminated) NUL
//! ```
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::net::index_vec::Idx;
use crate::net::Net;
use crate::unfold::model::Unfolding;

#[derive(Debug, Error)]
pub enum MciError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("negative count {0} in mci header")]
    NegativeCount(i32),
    #[error("name table is not valid utf-8")]
    Name(#[from] std::string::FromUtf8Error),
    #[error("unfolding too large for 32-bit mci ids")]
    Overflow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MciCondition {
    pub place: u32,
    pub tokens: u32,
    pub producer: Option<u32>,
    pub consumers: Vec<u32>,
}

/// What a reader recovers from an MCI file. Ids keep the file's 1-based
/// numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MciFile {
    pub event_transitions: Vec<u32>,
    pub conditions: Vec<MciCondition>,
    pub cuts: usize,
    pub harmful: Vec<u32>,
    pub cutoffs: Vec<(u32, u32)>,
    pub place_names: Vec<String>,
    pub transition_names: Vec<String>,
}

fn count(n: usize) -> Result<i32, MciError> {
    i32::try_from(n).map_err(|_| MciError::Overflow)
}

fn id(index: usize) -> Result<i32, MciError> {
    count(index + 1)
}

pub fn write_mci_to<W: Write>(out: &mut W, net: &Net, unfolding: &Unfolding) -> Result<(), MciError> {
    out.write_i32::<LittleEndian>(count(unfolding.conditions_len())?)?;
    out.write_i32::<LittleEndian>(count(unfolding.events_len())?)?;
    // no repeated-marking queries
    out.write_i32::<LittleEndian>(0)?;

    for event in unfolding.events.iter() {
        out.write_i32::<LittleEndian>(id(event.transition.index())?)?;
        out.write_i32::<LittleEndian>(0)?;
    }

    for cond in unfolding.conditions.iter() {
        out.write_i32::<LittleEndian>(id(cond.place.index())?)?;
        out.write_i32::<LittleEndian>(cond.tokens as i32)?;
        out.write_i32::<LittleEndian>(0)?;
        let producer = match cond.producer {
            Some(event) => id(event.index())?,
            None => 0,
        };
        out.write_i32::<LittleEndian>(producer)?;
        for consumer in &cond.consumers {
            out.write_i32::<LittleEndian>(id(consumer.index())?)?;
        }
        out.write_i32::<LittleEndian>(0)?;
    }

    // harmful events, cutoff pairs, trailing terminator
    for _ in 0..3 {
        out.write_i32::<LittleEndian>(0)?;
    }

    let longest = net
        .places
        .iter()
        .map(|p| p.name.len())
        .chain(net.transitions.iter().map(|t| t.name.len()))
        .max()
        .unwrap_or(0);
    out.write_i32::<LittleEndian>(count(net.places_len())?)?;
    out.write_i32::<LittleEndian>(count(net.transitions_len())?)?;
    out.write_i32::<LittleEndian>(count(longest)?)?;

    for name in net.places.iter().map(|p| &p.name) {
        out.write_all(name.as_bytes())?;
        out.write_u8(0)?;
    }
    out.write_u8(0)?;
    for name in net.transitions.iter().map(|t| &t.name) {
        out.write_all(name.as_bytes())?;
        out.write_u8(0)?;
    }
    out.write_u8(0)?;
    Ok(())
}

pub fn write_mci<P: AsRef<Path>>(path: P, net: &Net, unfolding: &Unfolding) -> Result<(), MciError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_mci_to(&mut out, net, unfolding)?;
    out.flush()?;
    Ok(())
}

fn read_count<R: Read>(input: &mut R) -> Result<usize, MciError> {
    let value = input.read_i32::<LittleEndian>()?;
    usize::try_from(value).map_err(|_| MciError::NegativeCount(value))
}

fn read_id<R: Read>(input: &mut R) -> Result<u32, MciError> {
    let value = input.read_i32::<LittleEndian>()?;
    u32::try_from(value).map_err(|_| MciError::NegativeCount(value))
}

fn read_name<R: Read>(input: &mut R) -> Result<String, MciError> {
    let mut bytes = Vec::new();
    loop {
        match input.read_u8()? {
            0 => break,
            b => bytes.push(b),
        }
    }
    Ok(String::from_utf8(bytes)?)
}

pub fn read_mci_from<R: Read>(input: &mut R) -> Result<MciFile, MciError> {
    let conditions = read_count(input)?;
    let events = read_count(input)?;
    let mut file = MciFile::default();

    // cut records: (repeat, |cut|, |events|, cut..., events...) until repeat == 0
    let mut repeat = input.read_i32::<LittleEndian>()?;
    while repeat != 0 {
        let cut = read_count(input)?;
        let evs = read_count(input)?;
        for _ in 0..cut + evs {
            input.read_i32::<LittleEndian>()?;
        }
        file.cuts += 1;
        repeat = input.read_i32::<LittleEndian>()?;
    }

    for _ in 0..events {
        file.event_transitions.push(read_id(input)?);
        input.read_i32::<LittleEndian>()?;
    }

    for _ in 0..conditions {
        let place = read_id(input)?;
        let tokens = read_id(input)?;
        input.read_i32::<LittleEndian>()?;
        let producer = Some(read_id(input)?).filter(|e| *e != 0);
        let mut consumers = Vec::new();
        loop {
            match read_id(input)? {
                0 => break,
                e => consumers.push(e),
            }
        }
        file.conditions.push(MciCondition {
            place,
            tokens,
            producer,
            consumers,
        });
    }

    loop {
        match read_id(input)? {
            0 => break,
            e => file.harmful.push(e),
        }
    }
    loop {
        match read_id(input)? {
            0 => break,
            e => {
                let witness = read_id(input)?;
                file.cutoffs.push((e, witness));
            }
        }
    }
    while read_id(input)? != 0 {}

    let places = read_count(input)?;
    let transitions = read_count(input)?;
    let _longest = read_count(input)?;
    for _ in 0..places {
        file.place_names.push(read_name(input)?);
    }
    input.read_u8()?;
    for _ in 0..transitions {
        file.transition_names.push(read_name(input)?);
    }
    input.read_u8()?;

    Ok(file)
}

pub fn read_mci<P: AsRef<Path>>(path: P) -> Result<MciFile, MciError> {
    let mut input = BufReader::new(File::open(path)?);
    read_mci_from(&mut input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeList;
    use crate::net::{Place, Transition};

    #[test]
    fn records_follow_the_documented_layout() {
        let mut net = Net::empty();
        let p = net.add_place(Place::new("p", 1)).unwrap();
        let q = net.add_place(Place::new("q", 0)).unwrap();
        let t = net.add_transition(Transition::new("go")).unwrap();
        net.add_input_arc(p, t);
        net.add_output_arc(q, t);

        let mut unf = Unfolding::new(&net);
        let c0 = unf.add_condition(p, 1, None);
        let e0 = unf.add_event(t, NodeList::from_slice(&[c0]), Vec::new());
        unf.add_condition(q, 1, Some(e0));

        let mut bytes = Vec::new();
        write_mci_to(&mut bytes, &net, &unf).unwrap();

        let ints: Vec<i32> = bytes[..4 * 21]
            .chunks(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(
            ints,
            vec![
                2, 1, // counts
                0, // cuts
                1, 0, // e1 = go
                1, 1, 0, 0, 1, 0, // c1 on p, consumed by e1
                2, 1, 0, 1, 0, // c2 on q, produced by e1
                0, 0, 0, // harmful, cutoffs, terminator
                2, 1, // places, transitions
            ]
        );
        assert_eq!(&bytes[4 * 22..], b"p\0q\0\0go\0\0");

        let parsed = read_mci_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(parsed.event_transitions, vec![1]);
        assert_eq!(parsed.conditions[0].consumers, vec![1]);
        assert_eq!(parsed.conditions[1].producer, Some(1));
        assert_eq!(parsed.place_names, vec!["p", "q"]);
        assert_eq!(parsed.transition_names, vec!["go"]);
    }

    #[test]
    fn reader_skips_cut_records_and_collects_cutoffs() {
        let mut bytes = Vec::new();
        let ints = [
            0, 2, // counts
            -1, 1, 0, 3, 0, // one cut record
            1, 0, 1, 0, // two events of transition 1
            2, 0, // harmful
            2, 1, 0, // e2 is a cutoff with witness e1
            0, // terminator
            1, 1, 1, // places, transitions, longest name
        ];
        for v in ints {
            bytes.write_i32::<LittleEndian>(v).unwrap();
        }
        bytes.extend_from_slice(b"p\0\0t\0\0");

        let parsed = read_mci_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(parsed.cuts, 1);
        assert_eq!(parsed.event_transitions, vec![1, 1]);
        assert_eq!(parsed.harmful, vec![2]);
        assert_eq!(parsed.cutoffs, vec![(2, 1)]);
        assert_eq!(parsed.place_names, vec!["p"]);
        assert_eq!(parsed.transition_names, vec!["t"]);
        assert!(parsed.conditions.is_empty());
    }
}
