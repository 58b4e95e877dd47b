// One reader on the calling thread, `workers` aggregation threads.
//
// The reader takes empty buffers from `empty_bufs`, fills them with
// newline-aligned chunks and pushes them to `full_chunks`. Each worker owns
// its own StationTable and hands the buffer back when done, so at most
// `config.buffers` chunks exist at any time. Tables are merged once every
// worker has finished.

use std::{fs::File, io::Read, path::Path, thread, time::Instant};

use crate::{
    aggregate::aggregate_chunk,
    config::Config,
    error::{Error, Result},
    pool::Pool,
    reader::{Chunk, ChunkReader},
    report::ResultSet,
    table::StationTable,
};

pub fn run(path: &Path, config: &Config) -> Result<ResultSet> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })?;
    run_reader(file, config)
}

pub fn run_reader<R: Read>(input: R, config: &Config) -> Result<ResultSet> {
    config.validate()?;
    let start = Instant::now();

    // create buf pools and fill empty bufs
    let empty_bufs = Pool::new();
    let full_chunks = Pool::new();
    for _ in 0..config.buffers {
        empty_bufs.put(Vec::with_capacity(config.block_size))?;
    }

    let (empty_bufs, full_chunks) = (&empty_bufs, &full_chunks);
    let (chunks, tables) = thread::scope(|s| -> Result<(usize, Vec<StationTable>)> {
        let workers: Vec<_> = (0..config.workers)
            .map(|_| s.spawn(move || worker_thread(empty_bufs, full_chunks)))
            .collect();

        let read_result = reader_thread(input, config, empty_bufs, full_chunks);
        match read_result {
            Ok(_) => full_chunks.close(),
            Err(_) => full_chunks.abort(),
        }

        let mut tables = Vec::with_capacity(workers.len());
        let mut failure = None;
        for handle in workers {
            match handle.join() {
                Ok(Ok(table)) => tables.push(table),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(_) => {
                    failure.get_or_insert(Error::WorkerPanicked);
                }
            }
        }

        let chunks = read_result?;
        match failure {
            Some(e) => Err(e),
            None => Ok((chunks, tables)),
        }
    })?;

    if config.verbose {
        eprintln!(
            "Aggregated {} chunks on {} workers in {:?} seconds",
            chunks,
            config.workers,
            start.elapsed().as_secs_f32()
        );
    }

    Ok(ResultSet::merge(tables))
}

fn reader_thread<R: Read>(
    input: R,
    config: &Config,
    empty_bufs: &Pool<Vec<u8>>,
    full_chunks: &Pool<Chunk>,
) -> Result<usize> {
    let mut reader = ChunkReader::new(input, config.block_size);

    // an aborted pool means a worker failed, stop reading
    while let Some(buf) = empty_bufs.take()? {
        let chunk = match reader.next_chunk(buf)? {
            Some(chunk) => chunk,
            None => break,
        };
        if config.verbose {
            eprintln!("Processing chunk {} size {}", chunk.index(), chunk.len());
        }
        full_chunks.put(chunk)?;
    }

    Ok(reader.produced())
}

// Aborts both pools if a worker unwinds, so the reader never waits on a
// buffer that will not come back.
struct PanicGuard<'a> {
    empty_bufs: &'a Pool<Vec<u8>>,
    full_chunks: &'a Pool<Chunk>,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.empty_bufs.abort();
            self.full_chunks.abort();
        }
    }
}

fn worker_thread(empty_bufs: &Pool<Vec<u8>>, full_chunks: &Pool<Chunk>) -> Result<StationTable> {
    let _guard = PanicGuard {
        empty_bufs,
        full_chunks,
    };
    let mut table = StationTable::new();

    while let Some(chunk) = full_chunks.take()? {
        if let Err(e) = aggregate_chunk(chunk.as_bytes(), &mut table) {
            empty_bufs.abort();
            full_chunks.abort();
            return Err(e);
        }

        // return the buf to the empty_buf pool for the reader thread to fill
        empty_bufs.put(chunk.into_buffer())?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, io};

    use super::*;
    use crate::hash::djb2;

    fn config(workers: usize, block_size: usize) -> Config {
        Config::with_workers(workers).block_size(block_size)
    }

    fn report(input: &[u8], workers: usize, block_size: usize) -> String {
        run_reader(input, &config(workers, block_size)).unwrap().format()
    }

    #[test]
    fn panicking_worker_releases_the_reader() {
        let empty_bufs = Pool::new();
        let full_chunks: Pool<Chunk> = Pool::new();
        empty_bufs.put(Vec::new()).unwrap();

        thread::scope(|s| {
            let worker = s.spawn(|| {
                let _guard = PanicGuard {
                    empty_bufs: &empty_bufs,
                    full_chunks: &full_chunks,
                };
                panic!("worker blew up");
            });
            assert!(worker.join().is_err());
        });

        // the reader would otherwise block here forever
        assert!(empty_bufs.take().unwrap().is_none());
        assert!(full_chunks.take().unwrap().is_none());
    }

    #[test]
    fn tokyo_oslo_scenario() {
        let input = b"Tokyo;15.2\nTokyo;10.0\nOslo;-2.3\n";
        assert_eq!(
            report(input, 1, 1024),
            "{Oslo=-2.3/-2.3/-2.3, Tokyo=10.0/12.6/15.2}"
        );
    }

    #[test]
    fn block_size_and_worker_count_do_not_change_the_report() {
        let names = ["Abha", "Oslo", "Tokyo", "São Paulo", "Zürich", "Ez", "FY"];
        let mut input = String::new();
        // name -> (min, max, sum, count) in tenths
        let mut oracle: BTreeMap<&str, (i32, i32, i64, u64)> = BTreeMap::new();
        for i in 0..2_000i32 {
            let name = names[i as usize % names.len()];
            let tenths = (i * 37) % 1999 - 999;
            let sign = if tenths < 0 { "-" } else { "" };
            let (int, frac) = (tenths.abs() / 10, tenths.abs() % 10);
            input.push_str(&format!("{name};{sign}{int}.{frac}\n"));

            let entry = oracle.entry(name).or_insert((tenths, tenths, 0, 0));
            entry.0 = entry.0.min(tenths);
            entry.1 = entry.1.max(tenths);
            entry.2 += tenths as i64;
            entry.3 += 1;
        }

        let layouts = [(1, 1 << 20), (1, 7), (2, 13), (4, 64), (8, 1000), (3, 4096)];
        let mut reports = Vec::new();
        for (workers, block_size) in layouts {
            let result = run_reader(input.as_bytes(), &config(workers, block_size)).unwrap();
            assert_eq!(result.len(), names.len(), "{workers} workers, block size {block_size}");
            for (name, (min, max, sum, count)) in &oracle {
                let stats = result.get(name).unwrap();
                assert_eq!(stats.count(), *count, "{name}");
                assert_eq!(stats.min(), *min as f64 / 10.0, "{name}");
                assert_eq!(stats.max(), *max as f64 / 10.0, "{name}");
                assert_eq!(stats.sum(), *sum as f64 / 10.0, "{name}");
            }
            reports.push(result.format());
        }
        assert!(reports.iter().all(|r| *r == reports[0]));
    }

    #[test]
    fn record_straddling_blocks_counts_once() {
        // block of 10 ends in the middle of "Oslo;-2.3"
        let input = b"Abha;5.0\nOslo;-2.3\nAbha;7.0\n";
        let result = run_reader(&input[..], &config(2, 10)).unwrap();
        assert_eq!(result.get("Oslo").unwrap().count(), 1);
        assert_eq!(result.get("Oslo").unwrap().min(), -2.3);
        assert_eq!(result.get("Abha").unwrap().count(), 2);
    }

    #[test]
    fn final_record_without_newline_is_kept() {
        let input = b"A;1.0\nB;2.0\nA;3.0";
        for block_size in [1, 4, 5, 100] {
            assert_eq!(
                report(input, 2, block_size),
                "{A=1.0/2.0/3.0, B=2.0/2.0/2.0}",
                "block size {block_size}"
            );
        }
    }

    #[test]
    fn colliding_names_are_reported_separately() {
        assert_eq!(djb2(b"Ez"), djb2(b"FY"));
        let input = b"Ez;1.0\nFY;5.0\nEz;3.0\n";
        assert_eq!(report(input, 1, 4), "{Ez=1.0/2.0/3.0, FY=5.0/5.0/5.0}");
    }

    #[test]
    fn empty_input_gives_empty_report() {
        assert_eq!(report(b"", 2, 16), "{}");
    }

    #[test]
    fn same_input_same_output() {
        let input = b"B;1.0\nA;-1.5\nB;99.9\nC;0.0\n";
        assert_eq!(report(input, 3, 5), report(input, 3, 5));
    }

    #[test]
    fn malformed_record_fails_the_run() {
        let mut input = b"A;1.0\n".repeat(100);
        input.extend_from_slice(b"B;not-a-number\n");
        input.extend_from_slice(&b"A;1.0\n".repeat(100));

        let err = run_reader(&input[..], &config(4, 32)).unwrap_err();
        match err {
            Error::MalformedRecord { record, .. } => assert_eq!(record, "B;not-a-number"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = run_reader(&b"A;1.0\n"[..], &config(0, 16)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    struct BrokenAfter<'a>(&'a [u8]);

    impl Read for BrokenAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_failure_fails_the_run() {
        let input = b"A;1.0\n".repeat(50);
        let err = run_reader(BrokenAfter(&input), &config(2, 16)).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let path = std::env::temp_dir().join("obrc-definitely-missing.txt");
        let err = run(&path, &config(1, 16)).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }

    #[test]
    fn runs_over_a_file() {
        let path = std::env::temp_dir().join(format!("obrc-pipeline-{}.txt", std::process::id()));
        fs::write(&path, "Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nHamburg;34.2\n").unwrap();
        let result = run(&path, &config(2, 8));
        fs::remove_file(&path).unwrap();

        assert_eq!(
            result.unwrap().format(),
            "{Bulawayo=8.9/8.9/8.9, Hamburg=12.0/23.1/34.2, Palembang=38.8/38.8/38.8}"
        );
    }
}
