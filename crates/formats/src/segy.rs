//! SEG-Y style trace exchange format.
//!
//! Layout (big-endian throughout):
//! - 3200-byte textual header
//! - 400-byte binary header at offset 3200
//! - from offset 3600, repeating records of a 240-byte trace header
//!   followed by `samples_per_trace` 4-byte samples
//!
//! Every record occupies exactly `240 + samples_per_trace * 4` bytes; the
//! per-trace sample count at header offset 114 is reported but does not
//! change the record stride.

use std::io::Write;

use tracing::debug;

pub const TEXT_HEADER_LEN: usize = 3200;
pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_DATA_OFFSET: usize = TEXT_HEADER_LEN + BINARY_HEADER_LEN;
pub const TRACE_HEADER_LEN: usize = 240;
pub const SAMPLE_LEN: usize = 4;

// Binary header field offsets, relative to the start of the binary header.
const BH_JOB_ID: usize = 0;
const BH_LINE_NUMBER: usize = 4;
const BH_REEL_NUMBER: usize = 8;
const BH_NUM_TRACES: usize = 12;
const BH_NUM_AUX_TRACES: usize = 14;
const BH_SAMPLE_INTERVAL: usize = 16;
const BH_SAMPLES_PER_TRACE: usize = 20;
const BH_DATA_FORMAT: usize = 24;

// Trace header field offsets, relative to the start of the trace record.
const TH_TRACE_NUMBER: usize = 0;
const TH_NUM_SAMPLES: usize = 114;
const TH_INLINE: usize = 188;
const TH_CROSSLINE: usize = 192;

#[derive(Debug)]
pub enum FormatError {
    TooShort {
        len: usize,
    },
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    InvalidSamplesPerTrace {
        found: i16,
    },
    UnsupportedSampleFormat {
        code: i16,
    },
    NoTraces,
    TraceLength {
        trace_index: usize,
        expected: usize,
        found: usize,
    },
    Io {
        source: String,
    },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::TooShort { len } => write!(
                f,
                "file is {len} bytes, shorter than the {TRACE_DATA_OFFSET}-byte SEG-Y headers"
            ),
            FormatError::Truncated {
                offset,
                needed,
                available,
            } => write!(
                f,
                "trace record at offset {offset} truncated: needs {needed} bytes, {available} available"
            ),
            FormatError::InvalidSamplesPerTrace { found } => {
                write!(f, "invalid samples per trace in binary header: {found}")
            }
            FormatError::UnsupportedSampleFormat { code } => {
                write!(f, "unsupported sample format code {code}")
            }
            FormatError::NoTraces => write!(f, "no traces found in SEG-Y file"),
            FormatError::TraceLength {
                trace_index,
                expected,
                found,
            } => write!(
                f,
                "trace {trace_index} has {found} samples, binary header declares {expected}"
            ),
            FormatError::Io { source } => write!(f, "I/O error: {source}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Sample encodings named by the binary header's data-format code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SampleFormat {
    IbmFloat,
    Int32,
    Int16,
    IeeeFloat,
    Int8,
    /// Unknown codes are read as IEEE floats.
    Other(i16),
}

impl SampleFormat {
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => SampleFormat::IbmFloat,
            2 => SampleFormat::Int32,
            3 => SampleFormat::Int16,
            5 => SampleFormat::IeeeFloat,
            8 => SampleFormat::Int8,
            other => SampleFormat::Other(other),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            SampleFormat::IbmFloat => 1,
            SampleFormat::Int32 => 2,
            SampleFormat::Int16 => 3,
            SampleFormat::IeeeFloat => 5,
            SampleFormat::Int8 => 8,
            SampleFormat::Other(code) => code,
        }
    }

    fn check_four_byte(self) -> Result<(), FormatError> {
        match self {
            SampleFormat::Int16 | SampleFormat::Int8 => {
                Err(FormatError::UnsupportedSampleFormat { code: self.code() })
            }
            _ => Ok(()),
        }
    }

    fn decode(self, raw: [u8; 4]) -> f32 {
        match self {
            SampleFormat::IbmFloat => ibm_to_f32(u32::from_be_bytes(raw)),
            SampleFormat::Int32 => i32::from_be_bytes(raw) as f32,
            _ => f32::from_be_bytes(raw),
        }
    }

    fn encode(self, v: f32) -> [u8; 4] {
        match self {
            SampleFormat::IbmFloat => f32_to_ibm(v).to_be_bytes(),
            SampleFormat::Int32 => (v.round() as i32).to_be_bytes(),
            _ => v.to_be_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryHeader {
    pub job_id: i32,
    pub line_number: i32,
    pub reel_number: i32,
    pub num_traces: i16,
    pub num_aux_traces: i16,
    /// Microseconds per sample.
    pub sample_interval: i16,
    pub samples_per_trace: i16,
    pub data_format: i16,
}

impl BinaryHeader {
    /// Header for IEEE-float traces with the given sample interval in milliseconds.
    pub fn ieee(num_traces: usize, samples_per_trace: usize, sample_interval_ms: f64) -> Self {
        Self {
            num_traces: num_traces.min(i16::MAX as usize) as i16,
            sample_interval: (sample_interval_ms * 1000.0).round() as i16,
            samples_per_trace: samples_per_trace.min(i16::MAX as usize) as i16,
            data_format: SampleFormat::IeeeFloat.code(),
            ..Self::default()
        }
    }

    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat::from_code(self.data_format)
    }

    pub fn sample_interval_ms(&self) -> f64 {
        self.sample_interval as f64 / 1000.0
    }

    fn samples_per_trace_checked(&self) -> Result<usize, FormatError> {
        if self.samples_per_trace <= 0 {
            return Err(FormatError::InvalidSamplesPerTrace {
                found: self.samples_per_trace,
            });
        }
        Ok(self.samples_per_trace as usize)
    }

    fn record_len(&self) -> Result<usize, FormatError> {
        Ok(TRACE_HEADER_LEN + self.samples_per_trace_checked()? * SAMPLE_LEN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceHeader {
    pub trace_number: i32,
    pub inline: i32,
    pub crossline: i32,
    pub num_samples: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub header: TraceHeader,
    pub samples: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegyFile {
    pub text_header: String,
    pub binary_header: BinaryHeader,
    pub traces: Vec<Trace>,
}

impl SegyFile {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        decode_segy(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        encode_segy(self)
    }
}

pub fn decode_segy(bytes: &[u8]) -> Result<SegyFile, FormatError> {
    let binary_header = read_binary_header(bytes)?;
    let format = binary_header.sample_format();
    format.check_four_byte()?;
    let samples_per_trace = binary_header.samples_per_trace_checked()?;
    let record_len = binary_header.record_len()?;

    let text_header = decode_text_header(&bytes[..TEXT_HEADER_LEN]);

    let mut traces = Vec::new();
    let mut offset = TRACE_DATA_OFFSET;
    while offset < bytes.len() {
        let available = bytes.len() - offset;
        if available < record_len {
            return Err(FormatError::Truncated {
                offset,
                needed: record_len,
                available,
            });
        }

        let record = &bytes[offset..offset + record_len];
        let header = TraceHeader {
            trace_number: be_i32(record, TH_TRACE_NUMBER),
            inline: be_i32(record, TH_INLINE),
            crossline: be_i32(record, TH_CROSSLINE),
            num_samples: be_i16(record, TH_NUM_SAMPLES),
        };

        let payload = &record[TRACE_HEADER_LEN..];
        let mut samples = Vec::with_capacity(samples_per_trace);
        for raw in payload.chunks_exact(SAMPLE_LEN) {
            samples.push(format.decode([raw[0], raw[1], raw[2], raw[3]]));
        }

        traces.push(Trace { header, samples });
        offset += record_len;
    }

    if traces.is_empty() {
        return Err(FormatError::NoTraces);
    }

    debug!(
        traces = traces.len(),
        samples_per_trace,
        data_format = binary_header.data_format,
        "decoded SEG-Y"
    );

    Ok(SegyFile {
        text_header,
        binary_header,
        traces,
    })
}

/// Returns the longest prefix of `bytes` that holds only whole trace records.
///
/// Lets a caller drop a corrupt tail before decoding instead of failing on it.
pub fn whole_trace_prefix(bytes: &[u8]) -> Result<&[u8], FormatError> {
    let binary_header = read_binary_header(bytes)?;
    let record_len = binary_header.record_len()?;
    let whole = (bytes.len() - TRACE_DATA_OFFSET) / record_len;
    Ok(&bytes[..TRACE_DATA_OFFSET + whole * record_len])
}

/// Stable identity of a SEG-Y payload (blake3, hex).
pub fn content_id(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn encode_segy(file: &SegyFile) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    encode_segy_to_writer(file, &mut out)?;
    Ok(out)
}

pub fn encode_segy_to_writer<W: Write>(file: &SegyFile, w: &mut W) -> Result<(), FormatError> {
    let bh = &file.binary_header;
    let format = bh.sample_format();
    format.check_four_byte()?;
    let samples_per_trace = bh.samples_per_trace_checked()?;

    let mut text = [b' '; TEXT_HEADER_LEN];
    for (dst, ch) in text.iter_mut().zip(file.text_header.chars()) {
        *dst = if ch.is_ascii() { ch as u8 } else { b'?' };
    }
    write_all(w, &text)?;

    let mut binary = [0u8; BINARY_HEADER_LEN];
    put_i32(&mut binary, BH_JOB_ID, bh.job_id);
    put_i32(&mut binary, BH_LINE_NUMBER, bh.line_number);
    put_i32(&mut binary, BH_REEL_NUMBER, bh.reel_number);
    put_i16(&mut binary, BH_NUM_TRACES, bh.num_traces);
    put_i16(&mut binary, BH_NUM_AUX_TRACES, bh.num_aux_traces);
    put_i16(&mut binary, BH_SAMPLE_INTERVAL, bh.sample_interval);
    put_i16(&mut binary, BH_SAMPLES_PER_TRACE, bh.samples_per_trace);
    put_i16(&mut binary, BH_DATA_FORMAT, bh.data_format);
    write_all(w, &binary)?;

    for (trace_index, trace) in file.traces.iter().enumerate() {
        if trace.samples.len() != samples_per_trace {
            return Err(FormatError::TraceLength {
                trace_index,
                expected: samples_per_trace,
                found: trace.samples.len(),
            });
        }

        let mut header = [0u8; TRACE_HEADER_LEN];
        put_i32(&mut header, TH_TRACE_NUMBER, trace.header.trace_number);
        put_i16(&mut header, TH_NUM_SAMPLES, trace.header.num_samples);
        put_i32(&mut header, TH_INLINE, trace.header.inline);
        put_i32(&mut header, TH_CROSSLINE, trace.header.crossline);
        write_all(w, &header)?;

        let mut payload = Vec::with_capacity(samples_per_trace * SAMPLE_LEN);
        for &s in &trace.samples {
            payload.extend_from_slice(&format.encode(s));
        }
        write_all(w, &payload)?;
    }

    Ok(())
}

fn read_binary_header(bytes: &[u8]) -> Result<BinaryHeader, FormatError> {
    if bytes.len() < TRACE_DATA_OFFSET {
        return Err(FormatError::TooShort { len: bytes.len() });
    }
    let bh = &bytes[TEXT_HEADER_LEN..TRACE_DATA_OFFSET];
    Ok(BinaryHeader {
        job_id: be_i32(bh, BH_JOB_ID),
        line_number: be_i32(bh, BH_LINE_NUMBER),
        reel_number: be_i32(bh, BH_REEL_NUMBER),
        num_traces: be_i16(bh, BH_NUM_TRACES),
        num_aux_traces: be_i16(bh, BH_NUM_AUX_TRACES),
        sample_interval: be_i16(bh, BH_SAMPLE_INTERVAL),
        samples_per_trace: be_i16(bh, BH_SAMPLES_PER_TRACE),
        data_format: be_i16(bh, BH_DATA_FORMAT),
    })
}

fn decode_text_header(bytes: &[u8]) -> String {
    // Fixed-width text, kept verbatim; bytes outside ASCII map one-to-one to Latin-1.
    bytes.iter().map(|&b| b as char).collect()
}

// Callers have already bounds-checked the record; these never see short slices.
fn be_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn be_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn put_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_be_bytes());
}

fn put_i16(buf: &mut [u8], at: usize, v: i16) {
    buf[at..at + 2].copy_from_slice(&v.to_be_bytes());
}

fn write_all(w: &mut impl Write, bytes: &[u8]) -> Result<(), FormatError> {
    w.write_all(bytes).map_err(|e| FormatError::Io {
        source: e.to_string(),
    })
}

/// IBM System/360 single precision: sign bit, 7-bit base-16 exponent biased
/// by 64, 24-bit fraction.
fn ibm_to_f32(bits: u32) -> f32 {
    let fraction = (bits & 0x00ff_ffff) as f64 / 16_777_216.0;
    if fraction == 0.0 {
        return 0.0;
    }
    let exponent = ((bits >> 24) & 0x7f) as i32 - 64;
    let sign = if bits & 0x8000_0000 != 0 { -1.0 } else { 1.0 };
    (sign * fraction * 16f64.powi(exponent)) as f32
}

fn f32_to_ibm(v: f32) -> u32 {
    if v == 0.0 || !v.is_finite() {
        return 0;
    }
    let sign = if v < 0.0 { 0x8000_0000u32 } else { 0 };
    let mut fraction = (v as f64).abs();
    let mut exponent = 64i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 0.0625 {
        fraction *= 16.0;
        exponent -= 1;
    }
    let mut bits = (fraction * 16_777_216.0).round() as u32;
    if bits >= 0x0100_0000 {
        bits >>= 4;
        exponent += 1;
    }
    sign | ((exponent.clamp(0, 127) as u32) << 24) | bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn synthetic_file(num_traces: usize, samples: usize) -> SegyFile {
        let mut binary_header = BinaryHeader::ieee(num_traces, samples, 4.0);
        binary_header.job_id = 17;
        binary_header.line_number = 1225;
        binary_header.reel_number = 3;
        binary_header.num_aux_traces = 2;

        let traces = (0..num_traces)
            .map(|i| Trace {
                header: TraceHeader {
                    trace_number: i as i32 + 1,
                    inline: 1200 + (i / 4) as i32,
                    crossline: 2000 + (i % 4) as i32,
                    num_samples: samples as i16,
                },
                samples: (0..samples).map(|t| (i * 100 + t) as f32 * 0.5 - 3.0).collect(),
            })
            .collect();

        SegyFile {
            text_header: "C 1 CLIENT DEMO SURVEY".to_string(),
            binary_header,
            traces,
        }
    }

    #[test]
    fn decodes_known_headers_and_traces() {
        let file = synthetic_file(8, 12);
        let bytes = encode_segy(&file).expect("encode");
        assert_eq!(bytes.len(), TRACE_DATA_OFFSET + 8 * (TRACE_HEADER_LEN + 12 * 4));

        let decoded = decode_segy(&bytes).expect("decode");
        assert_eq!(decoded.binary_header, file.binary_header);
        assert_eq!(decoded.traces.len(), 8);
        assert!(decoded.traces.iter().all(|t| t.samples.len() == 12));
        assert_eq!(decoded.traces, file.traces);
        assert_eq!(decoded.text_header.len(), TEXT_HEADER_LEN);
        assert!(decoded.text_header.starts_with("C 1 CLIENT DEMO SURVEY"));
        assert_eq!(decoded.binary_header.sample_interval_ms(), 4.0);
    }

    #[test]
    fn header_fields_sit_at_fixed_offsets() {
        let bytes = encode_segy(&synthetic_file(1, 2)).expect("encode");
        assert_eq!(&bytes[3200..3204], &17i32.to_be_bytes());
        assert_eq!(&bytes[3220..3222], &2i16.to_be_bytes());
        assert_eq!(&bytes[3224..3226], &5i16.to_be_bytes());
        assert_eq!(&bytes[3600 + 188..3600 + 192], &1200i32.to_be_bytes());
        assert_eq!(&bytes[3600 + 192..3600 + 196], &2000i32.to_be_bytes());
        assert_eq!(&bytes[3600 + 114..3600 + 116], &2i16.to_be_bytes());
    }

    #[test]
    fn truncated_trace_reports_offset() {
        let bytes = encode_segy(&synthetic_file(3, 10)).expect("encode");
        let cut = &bytes[..bytes.len() - 7];
        match decode_segy(cut) {
            Err(FormatError::Truncated {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, TRACE_DATA_OFFSET + 2 * 280);
                assert_eq!(needed, 280);
                assert_eq!(available, 273);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let trimmed = whole_trace_prefix(cut).expect("prefix");
        let decoded = decode_segy(trimmed).expect("decode trimmed");
        assert_eq!(decoded.traces.len(), 2);
    }

    #[test]
    fn headers_without_traces_are_rejected() {
        let bytes = encode_segy(&synthetic_file(0, 10)).expect("encode");
        assert!(matches!(decode_segy(&bytes), Err(FormatError::NoTraces)));
        assert!(matches!(
            decode_segy(&bytes[..100]),
            Err(FormatError::TooShort { len: 100 })
        ));
    }

    #[test]
    fn zero_samples_per_trace_is_invalid() {
        let mut bytes = encode_segy(&synthetic_file(1, 4)).expect("encode");
        bytes[3220] = 0;
        bytes[3221] = 0;
        assert!(matches!(
            decode_segy(&bytes),
            Err(FormatError::InvalidSamplesPerTrace { found: 0 })
        ));
    }

    #[test]
    fn ibm_and_integer_samples_decode() {
        assert_eq!(ibm_to_f32(0x4264_0000), 100.0);
        assert_eq!(ibm_to_f32(0xC264_0000), -100.0);
        assert_eq!(f32_to_ibm(100.0), 0x4264_0000);
        assert_eq!(ibm_to_f32(f32_to_ibm(-0.15625)), -0.15625);

        let mut file = synthetic_file(2, 3);
        file.binary_header.data_format = SampleFormat::Int32.code();
        for t in &mut file.traces {
            t.samples = vec![-2.0, 0.0, 7.0];
        }
        let decoded = decode_segy(&encode_segy(&file).expect("encode")).expect("decode");
        assert_eq!(decoded.traces[1].samples, vec![-2.0, 0.0, 7.0]);
    }

    #[test]
    fn two_byte_formats_are_unsupported() {
        let mut file = synthetic_file(1, 3);
        file.binary_header.data_format = 3;
        assert!(matches!(
            encode_segy(&file),
            Err(FormatError::UnsupportedSampleFormat { code: 3 })
        ));
    }

    #[test]
    fn encoder_rejects_ragged_traces() {
        let mut file = synthetic_file(2, 3);
        file.traces[1].samples.pop();
        assert!(matches!(
            encode_segy(&file),
            Err(FormatError::TraceLength {
                trace_index: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn content_id_is_stable() {
        let bytes = encode_segy(&synthetic_file(1, 3)).expect("encode");
        assert_eq!(content_id(&bytes), content_id(&bytes.clone()));
        assert_eq!(content_id(&bytes).len(), 64);
    }
}
