use crate::{error::Result, scanner::Scanner, table::StationTable, temperature::decode_tenths};

/// Folds every record of `chunk` into `table`, returning how many records
/// were read. Stops at the first malformed record.
pub fn aggregate_chunk(chunk: &[u8], table: &mut StationTable) -> Result<usize> {
    let mut scanner = Scanner::new(chunk);
    let mut records = 0;

    // main line reading loop
    while let Some(record) = scanner.next_record()? {
        let temp = decode_tenths(record.digits.as_bytes());
        table.record(record.name, temp)?;
        records += 1;
    }

    Ok(records)
}
