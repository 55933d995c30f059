//! Performance measurement (PM) expansion
//!
//! Three document shapes exist in the wild: the 3GPP 32.435
//! `measCollec/measInfo/measValue` layout (Ericsson), the same skeleton
//! under Huawei's bulk namespace with whitespace-packed type and result
//! lists, and Nokia's proprietary `PMSetup/PMMOResult/PMTarget` layout.
//! [`MeasurementSource`] reduces each of them to [`MeasurementBlock`]s;
//! [`expand`] then emits one row per (counter, index) combination for all
//! three, splitting comma-packed values into indexed rows.

use crate::error::{ConvertError, Result};
use crate::flatten::types::{FlatRow, FlattenStats, MeasuredObject, MeasurementBlock};
use crate::source::RawNode;

/// The three PM document shapes, one variant per vendor convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementSource {
    /// 3GPP 32.435 bulk format (Ericsson)
    ThreeGpp,
    /// Huawei's bulk format: positional type/result lists
    HuaweiBulk,
    /// Nokia's proprietary PMSetup export
    NokiaProprietary,
}

impl MeasurementSource {
    /// Reduce a parsed document to measurement blocks
    ///
    /// Objects whose routing table cannot be derived are dropped and
    /// counted in `stats`. A missing timing or result container aborts the
    /// file with [`ConvertError::SchemaMismatch`] naming the element path.
    pub fn blocks(&self, doc: &RawNode, stats: &mut FlattenStats) -> Result<Vec<MeasurementBlock>> {
        match self {
            MeasurementSource::ThreeGpp => three_gpp_blocks(doc, stats),
            MeasurementSource::HuaweiBulk => huawei_blocks(doc, stats),
            MeasurementSource::NokiaProprietary => nokia_blocks(doc, stats),
        }
    }
}

fn three_gpp_blocks(doc: &RawNode, stats: &mut FlattenStats) -> Result<Vec<MeasurementBlock>> {
    let begin_time = doc
        .find("measCollec")
        .ok_or_else(|| ConvertError::schema_mismatch("fileHeader/measCollec"))?
        .attr("beginTime")
        .map(str::to_owned);

    let mut blocks = Vec::new();
    for info in doc.find_all("measInfo") {
        let info_id = info
            .attr("measInfoId")
            .ok_or_else(|| ConvertError::schema_mismatch("measInfo@measInfoId"))?;
        // The table name is the last `=`-separated segment of the id.
        let table = info_id.rsplit('=').next().unwrap_or(info_id).trim().to_owned();

        let mut block = timed_block(info, "measInfo")?;
        block.begin_time = begin_time.clone();

        for meas_type in info.find_all("measType") {
            if let Some(code) = meas_type.attr("p") {
                let label = meas_type.text.as_deref().unwrap_or("").trim().to_owned();
                block.meas_types.push((code.to_owned(), label));
            }
        }

        for value in info.find_all("measValue") {
            if table.is_empty() {
                stats.unroutable += 1;
                continue;
            }
            let dn = value.attr("measObjLdn").unwrap_or("");
            let mut object = MeasuredObject {
                table: table.clone(),
                keys: decompose_dn(dn),
                results: Vec::new(),
            };
            for result in value.find_all("r") {
                if let Some(code) = result.attr("p") {
                    object
                        .results
                        .push((code.to_owned(), result.text.clone().unwrap_or_default()));
                }
            }
            block.objects.push(object);
        }
        blocks.push(block);
    }
    Ok(blocks)
}

fn huawei_blocks(doc: &RawNode, stats: &mut FlattenStats) -> Result<Vec<MeasurementBlock>> {
    let mut blocks = Vec::new();
    for info in doc.find_all("measInfo") {
        let types_text = info
            .find("measTypes")
            .ok_or_else(|| ConvertError::schema_mismatch("measInfo/measTypes"))?
            .text
            .clone()
            .unwrap_or_default();
        let names: Vec<&str> = types_text.split_whitespace().collect();

        let mut block = timed_block(info, "measInfo")?;

        for value in info.find_all("measValue") {
            let dn = value.attr("measObjLdn").unwrap_or("");
            // "NE=.../Cell:CellID=1,..." routes by the segment between the
            // slash and the colon; the rest decomposes into key columns.
            let Some((prefix, rest)) = dn.split_once(':') else {
                stats.unroutable += 1;
                continue;
            };
            let Some(table) = prefix.split('/').nth(1) else {
                stats.unroutable += 1;
                continue;
            };

            let results_text = value
                .find("measResults")
                .ok_or_else(|| ConvertError::schema_mismatch("measValue/measResults"))?
                .text
                .clone()
                .unwrap_or_default();
            let results = names
                .iter()
                .zip(results_text.split_whitespace())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();

            block.objects.push(MeasuredObject {
                table: table.trim().to_owned(),
                keys: decompose_dn(rest),
                results,
            });
        }
        blocks.push(block);
    }
    Ok(blocks)
}

fn nokia_blocks(doc: &RawNode, stats: &mut FlattenStats) -> Result<Vec<MeasurementBlock>> {
    let setup = doc
        .find("PMSetup")
        .ok_or_else(|| ConvertError::schema_mismatch("PMSetup"))?;
    let begin_time = setup.attr("startTime").map(str::to_owned);
    let rep_period = setup.attr("interval").map(str::to_owned);

    let mut blocks = Vec::new();
    for result in doc.find_all("PMMOResult") {
        let target = result
            .find("PMTarget")
            .ok_or_else(|| ConvertError::schema_mismatch("PMMOResult/PMTarget"))?;
        let Some(table) = target.attr("measurementType") else {
            stats.unroutable += 1;
            continue;
        };

        let mut dn_parts = Vec::new();
        for mo in result.find_all("MO") {
            for dn in mo.children_with_tag("DN") {
                if let Some(text) = dn.text.as_deref() {
                    dn_parts.push(text.trim().to_owned());
                }
            }
        }

        let counters = target
            .children
            .iter()
            .map(|counter| (counter.tag.clone(), counter.text.clone().unwrap_or_default()))
            .collect();

        blocks.push(MeasurementBlock {
            begin_time: begin_time.clone(),
            rep_period: rep_period.clone(),
            objects: vec![MeasuredObject {
                table: table.to_owned(),
                keys: vec![("MO_DN".to_string(), dn_parts.join(", "))],
                results: counters,
            }],
            ..MeasurementBlock::default()
        });
    }
    Ok(blocks)
}

fn timed_block(info: &RawNode, parent: &str) -> Result<MeasurementBlock> {
    let gran = info
        .find("granPeriod")
        .ok_or_else(|| ConvertError::schema_mismatch(format!("{parent}/granPeriod")))?;
    let rep = info
        .find("repPeriod")
        .ok_or_else(|| ConvertError::schema_mismatch(format!("{parent}/repPeriod")))?;

    Ok(MeasurementBlock {
        end_time: gran.attr("endTime").map(str::to_owned),
        duration: gran.attr("duration").map(str::to_owned),
        rep_period: rep.attr("duration").map(str::to_owned),
        ..MeasurementBlock::default()
    })
}

/// Split a `key=value,key=value` distinguished name into columns
///
/// Segments without `=` still become columns with an empty value, matching
/// how partially-qualified names show up in real exports.
fn decompose_dn(dn: &str) -> Vec<(String, String)> {
    let mut keys = Vec::new();
    for part in dn.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((key, value)) => keys.push((key.trim().to_owned(), value.trim().to_owned())),
            None => keys.push((part.to_owned(), String::new())),
        }
    }
    keys
}

/// Expand measurement blocks into flat rows
///
/// One row per (counter, index): a scalar raw value emits a single row
/// without an `index` column, a comma-packed value emits one row per
/// element with a zero-based `index`. Counter labels resolve against the
/// owning block's type map and fall back to the raw code when unmapped.
pub fn expand(blocks: &[MeasurementBlock]) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    for block in blocks {
        for object in &block.objects {
            for (code, raw) in &object.results {
                let label = block
                    .meas_types
                    .iter()
                    .find(|(candidate, _)| candidate == code)
                    .map(|(_, label)| label.as_str())
                    .unwrap_or(code);

                if raw.contains(',') {
                    for (index, part) in raw.split(',').enumerate() {
                        rows.push(make_row(block, object, label, part, Some(index)));
                    }
                } else {
                    rows.push(make_row(block, object, label, raw, None));
                }
            }
        }
    }
    rows
}

fn make_row(
    block: &MeasurementBlock,
    object: &MeasuredObject,
    label: &str,
    value: &str,
    index: Option<usize>,
) -> FlatRow {
    let mut row = FlatRow::new(object.table.clone());
    if let Some(stamp) = &block.begin_time {
        row.push("beginTime", stamp.clone());
    }
    if let Some(stamp) = &block.end_time {
        row.push("endTime", stamp.clone());
    }
    if let Some(period) = &block.duration {
        row.push("duration", period.clone());
    }
    if let Some(period) = &block.rep_period {
        row.push("repPeriod", period.clone());
    }
    for (key, key_value) in &object.keys {
        row.push(key.clone(), key_value.clone());
    }
    row.push(label, value);
    if let Some(index) = index {
        row.push("index", index.to_string());
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::reader::read_str;

    fn field<'a>(row: &'a FlatRow, name: &str) -> Option<&'a str> {
        row.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    const ERICSSON_PM: &str = r#"<measCollecFile xmlns="http://www.3gpp.org/ftp/specs/archive/32_series/32.435#measCollec">
  <fileHeader>
    <measCollec beginTime="2023-06-20T23:00:00+02:00"/>
  </fileHeader>
  <measData>
    <measInfo measInfoId="Exported measurements=RRC">
      <granPeriod duration="PT900S" endTime="2023-06-20T23:15:00+02:00"/>
      <repPeriod duration="PT900S"/>
      <measType p="1">RRC.ConnEstabSucc</measType>
      <measValue measObjLdn="SubNetwork=1,MeID=2">
        <r p="1">42</r>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;

    #[test]
    fn three_gpp_scalar_emits_one_row_without_index() {
        let doc = read_str(ERICSSON_PM).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::ThreeGpp.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.table, "RRC");
        assert_eq!(field(row, "SubNetwork"), Some("1"));
        assert_eq!(field(row, "MeID"), Some("2"));
        assert_eq!(field(row, "RRC.ConnEstabSucc"), Some("42"));
        assert_eq!(field(row, "beginTime"), Some("2023-06-20T23:00:00+02:00"));
        assert_eq!(field(row, "index"), None);
        assert_eq!(stats.unroutable, 0);
    }

    #[test]
    fn comma_packed_value_expands_into_indexed_rows() {
        let xml = ERICSSON_PM.replace(">42<", ">10,20,30<");
        let doc = read_str(&xml).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::ThreeGpp.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(rows.len(), 3);
        for (expected_index, (row, value)) in rows.iter().zip(["10", "20", "30"]).enumerate() {
            assert_eq!(field(row, "RRC.ConnEstabSucc"), Some(value));
            assert_eq!(field(row, "index"), Some(expected_index.to_string().as_str()));
            assert_eq!(field(row, "SubNetwork"), Some("1"));
        }
    }

    #[test]
    fn counter_labels_are_scoped_to_their_block() {
        let xml = r#"<measCollecFile>
  <fileHeader><measCollec beginTime="t0"/></fileHeader>
  <measInfo measInfoId="F=A">
    <granPeriod duration="PT900S" endTime="t1"/>
    <repPeriod duration="PT900S"/>
    <measType p="1">counterA</measType>
    <measValue measObjLdn="MeID=1"><r p="1">1</r></measValue>
  </measInfo>
  <measInfo measInfoId="F=B">
    <granPeriod duration="PT900S" endTime="t1"/>
    <repPeriod duration="PT900S"/>
    <measType p="1">counterB</measType>
    <measValue measObjLdn="MeID=1"><r p="1">2</r></measValue>
  </measInfo>
</measCollecFile>"#;
        let doc = read_str(xml).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::ThreeGpp.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(field(&rows[0], "counterA"), Some("1"));
        assert_eq!(field(&rows[1], "counterB"), Some("2"));
        assert_eq!(field(&rows[1], "counterA"), None);
    }

    #[test]
    fn missing_gran_period_is_schema_mismatch() {
        let xml = r#"<measCollecFile>
  <fileHeader><measCollec beginTime="t0"/></fileHeader>
  <measInfo measInfoId="F=A">
    <repPeriod duration="PT900S"/>
  </measInfo>
</measCollecFile>"#;
        let doc = read_str(xml).unwrap();
        let mut stats = FlattenStats::default();
        let err = MeasurementSource::ThreeGpp.blocks(&doc, &mut stats).unwrap_err();
        assert!(matches!(err, ConvertError::SchemaMismatch { ref element } if element == "measInfo/granPeriod"));
    }

    const HUAWEI_PM: &str = r#"<measCollecFile xmlns="http://latest/nmc-omc/cmNrm.doc#measCollec">
  <measData>
    <measInfo>
      <granPeriod duration="900" endTime="2023-06-20T23:00:00"/>
      <repPeriod duration="900"/>
      <measTypes>CellAvail CellUnavail</measTypes>
      <measValue measObjLdn="NE=101/Cell:Label=L1, CellID=3">
        <measResults>99 1</measResults>
      </measValue>
      <measValue measObjLdn="no-colon-here">
        <measResults>1 2</measResults>
      </measValue>
    </measInfo>
  </measData>
</measCollecFile>"#;

    #[test]
    fn huawei_zips_types_with_results_and_routes_by_dn_prefix() {
        let doc = read_str(HUAWEI_PM).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::HuaweiBulk.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.table == "Cell"));
        assert_eq!(field(&rows[0], "CellAvail"), Some("99"));
        assert_eq!(field(&rows[0], "Label"), Some("L1"));
        assert_eq!(field(&rows[0], "CellID"), Some("3"));
        assert_eq!(field(&rows[1], "CellUnavail"), Some("1"));
        assert_eq!(stats.unroutable, 1, "the malformed DN object is counted, not written");
    }

    #[test]
    fn huawei_extra_type_names_are_left_unpaired() {
        let xml = HUAWEI_PM.replace("99 1", "99");
        let doc = read_str(&xml).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::HuaweiBulk.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(rows.len(), 1);
        assert_eq!(field(&rows[0], "CellAvail"), Some("99"));
    }

    const NOKIA_PM: &str = r#"<OMeS>
  <PMSetup startTime="2023-06-21T00:00:00" interval="60">
    <PMMOResult>
      <MO>
        <DN>PLMN-PLMN/MRBTS-1</DN>
        <DN>PLMN-PLMN/MRBTS-1/LNBTS-1</DN>
      </MO>
      <PMTarget measurementType="LTE_Cell">
        <rrcConnEstabAtt>7</rrcConnEstabAtt>
        <rrcConnEstabSucc>6</rrcConnEstabSucc>
      </PMTarget>
    </PMMOResult>
  </PMSetup>
</OMeS>"#;

    #[test]
    fn nokia_routes_by_measurement_type_and_joins_dn() {
        let doc = read_str(NOKIA_PM).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::NokiaProprietary.blocks(&doc, &mut stats).unwrap();
        let rows = expand(&blocks);

        assert_eq!(rows.len(), 2);
        let row = &rows[0];
        assert_eq!(row.table, "LTE_Cell");
        assert_eq!(
            field(row, "MO_DN"),
            Some("PLMN-PLMN/MRBTS-1, PLMN-PLMN/MRBTS-1/LNBTS-1")
        );
        assert_eq!(field(row, "beginTime"), Some("2023-06-21T00:00:00"));
        assert_eq!(field(row, "repPeriod"), Some("60"));
        assert_eq!(field(row, "rrcConnEstabAtt"), Some("7"));
    }

    #[test]
    fn nokia_without_setup_is_schema_mismatch() {
        let doc = read_str("<OMeS></OMeS>").unwrap();
        let mut stats = FlattenStats::default();
        let err = MeasurementSource::NokiaProprietary
            .blocks(&doc, &mut stats)
            .unwrap_err();
        assert!(matches!(err, ConvertError::SchemaMismatch { ref element } if element == "PMSetup"));
    }

    #[test]
    fn empty_document_yields_no_rows() {
        let xml = r#"<measCollecFile>
  <fileHeader><measCollec beginTime="t0"/></fileHeader>
</measCollecFile>"#;
        let doc = read_str(xml).unwrap();
        let mut stats = FlattenStats::default();
        let blocks = MeasurementSource::ThreeGpp.blocks(&doc, &mut stats).unwrap();
        assert!(expand(&blocks).is_empty());
    }
}
