use std::io::{self, Read, Seek, SeekFrom, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use byterange::bytes::Bytes;
use byterange::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use byterange::http::StatusCode;
use byterange::{handle_response, BodyStream, ErrorKind, MemoryBody, RangeFile, ReaderState, SizeLimit, StreamBuffer};

const URL: &str = "http://example.com/resource";

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

fn multipart_headers() -> HeaderMap {
    headers(&[("Content-Type", "multipart/byteranges; boundary=X-BOUNDARY")])
}

fn multipart_body(parts: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (range, data) in parts {
        body.push_str("\r\n--X-BOUNDARY\r\n");
        body.push_str("Content-Type: application/octet-stream\r\n");
        body.push_str(&format!("Content-Range: {}\r\n\r\n", range));
        body.push_str(data);
    }
    body.push_str("\r\n--X-BOUNDARY--\r\n");
    body
}

// Hands out one byte per call.
struct Trickle(io::Cursor<Vec<u8>>);

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(1);
        self.0.read(&mut buf[..len])
    }
}

fn trickle(data: &str) -> StreamBuffer<Trickle> {
    StreamBuffer::new(Trickle(io::Cursor::new(data.as_bytes().to_vec())))
}

#[test]
fn test_whole_file_with_content_length() {
    let data = "x".repeat(1000);
    let mut file = handle_response(
        URL,
        StatusCode::OK,
        &headers(&[("Content-Length", "1000")]),
        MemoryBody::new(data.clone()),
    )
    .unwrap();

    assert_eq!(file.range(), (0, Some(1000)));
    let read = file.read_to_end_of_range().unwrap();
    assert_eq!(read.len(), 1000);
    assert_eq!(file.tell(), 1000);
    assert_eq!(file.state(), ReaderState::Exhausted);

    let err = file.read(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert!(file.read(0).unwrap().is_empty());
}

#[test]
fn test_whole_file_without_content_length() {
    let mut file = handle_response(URL, StatusCode::OK, &headers(&[]), MemoryBody::new("abcdefgh")).unwrap();

    assert_eq!(file.range(), (0, None));
    assert_eq!(&file.read(3).unwrap()[..], b"abc");
    // No boundary check on an unbounded range: the end of the stream is the end of data.
    assert_eq!(&file.read(100).unwrap()[..], b"defgh");
    assert!(file.read(10).unwrap().is_empty());
    assert_eq!(file.tell(), 8);
}

#[test]
fn test_whole_file_short_read() {
    let mut file = handle_response(
        URL,
        StatusCode::OK,
        &headers(&[("Content-Length", "10")]),
        MemoryBody::new("abcd"),
    )
    .unwrap();

    let err = file.read(10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShortRead);
    assert!(err.is_fatal());
}

#[test]
fn test_single_range() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 10-19/100")]),
        MemoryBody::new("0123456789"),
    )
    .unwrap();

    assert_eq!(file.tell(), 10);
    assert_eq!(file.boundary(), None);
    assert_eq!(&file.read(10).unwrap()[..], b"0123456789");
    assert_eq!(file.tell(), 20);

    let err = file.read(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert!(!err.is_fatal());
}

#[test]
fn test_single_range_read_across_boundary() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 10-19/100")]),
        MemoryBody::new("0123456789"),
    )
    .unwrap();

    assert_eq!(&file.read(4).unwrap()[..], b"0123");
    let err = file.read(7).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);

    // The failed read consumed nothing.
    assert_eq!(file.tell(), 14);
    assert_eq!(&file.read(6).unwrap()[..], b"456789");
}

#[test]
fn test_single_range_truncated() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 100-199/1000")]),
        MemoryBody::new("only a few bytes"),
    )
    .unwrap();

    let err = file.read(100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShortRead);

    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 100-199/1000")]),
        MemoryBody::new("only a few bytes"),
    )
    .unwrap();

    let err = file.seek(SeekFrom::Start(150)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShortRead);
}

#[test]
fn test_invalid_content_range() {
    for value in ["ftp 10-20/100", "bytes 20-10/100"] {
        let err = handle_response(
            URL,
            StatusCode::PARTIAL_CONTENT,
            &headers(&[("Content-Range", value)]),
            MemoryBody::new(""),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHttpRange, "{}", value);
    }
}

#[test]
fn test_unknown_status() {
    let err = handle_response(URL, StatusCode::NOT_FOUND, &headers(&[]), MemoryBody::new("")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHttpResponse);
    assert_eq!(err.url(), URL);
}

#[test]
fn test_multipart_reads_consume_boundaries() {
    let body = multipart_body(&[("bytes 0-4/100", "01234"), ("bytes 50-54/100", "56789")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();

    assert_eq!(file.boundary(), Some("X-BOUNDARY"));
    assert_eq!(file.tell(), 0);
    assert_eq!(&file.read(5).unwrap()[..], b"01234");
    assert_eq!(file.state(), ReaderState::AtBoundary);
    assert_eq!(&file.read(5).unwrap()[..], b"56789");
    assert_eq!(file.tell(), 55);
    assert_eq!(file.range(), (50, Some(5)));
    assert_eq!(
        file.part_headers().unwrap().get(header::CONTENT_RANGE).unwrap(),
        "bytes 50-54/100"
    );
}

#[test]
fn test_multipart_over_trickling_stream() {
    let body = multipart_body(&[("bytes 0-4/100", "01234"), ("bytes 50-54/100", "56789")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), trickle(&body)).unwrap();

    assert_eq!(&file.read(5).unwrap()[..], b"01234");
    assert_eq!(&file.read(5).unwrap()[..], b"56789");
    assert_eq!(file.tell(), 55);
}

#[test]
fn test_multipart_past_last_range() {
    let body = multipart_body(&[("bytes 0-4/100", "01234")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();

    assert_eq!(&file.read(5).unwrap()[..], b"01234");
    // The closing delimiter ends the ranges.
    let err = file.read(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert_eq!(file.state(), ReaderState::Exhausted);
    let err = file.seek(SeekFrom::Current(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}

#[test]
fn test_multipart_without_parts() {
    let err = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &multipart_headers(),
        MemoryBody::new("\r\n--X-BOUNDARY--\r\n"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHttpResponse);
}

#[test]
fn test_multipart_seek_across_ranges() {
    let body = multipart_body(&[
        ("bytes 0-9/1000", "0123456789"),
        ("bytes 100-109/1000", "abcdefghij"),
        ("bytes 500-509/1000", "ABCDEFGHIJ"),
    ]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();

    assert_eq!(file.seek(SeekFrom::Start(3)).unwrap(), 3);
    assert_eq!(&file.read(2).unwrap()[..], b"34");

    // Skips the rest of the first range and the whole second one.
    assert_eq!(file.seek(SeekFrom::Start(505)).unwrap(), 505);
    assert_eq!(&file.read(5).unwrap()[..], b"FGHIJ");
    assert_eq!(file.tell(), 510);
}

#[test]
fn test_multipart_seek_relative_and_from_end() {
    let body = multipart_body(&[("bytes 0-9/1000", "0123456789"), ("bytes 100-109/1000", "abcdefghij")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();

    file.seek(SeekFrom::Current(4)).unwrap();
    assert_eq!(&file.read(1).unwrap()[..], b"4");
    file.seek(SeekFrom::End(-2)).unwrap();
    assert_eq!(file.tell(), 8);
    assert_eq!(&file.read(2).unwrap()[..], b"89");

    // A target between two ranges lands on the start of the next one.
    file.seek(SeekFrom::Start(50)).unwrap();
    assert_eq!(file.tell(), 100);
    assert_eq!(&file.read(3).unwrap()[..], b"abc");
}

#[test]
fn test_seek_backward_fails() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 10-19/100")]),
        MemoryBody::new("0123456789"),
    )
    .unwrap();
    file.seek(SeekFrom::Start(15)).unwrap();
    let err = file.seek(SeekFrom::Start(14)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    let err = file.seek(SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert_eq!(file.tell(), 15);

    let body = multipart_body(&[("bytes 0-4/100", "01234"), ("bytes 50-54/100", "56789")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();
    file.seek(SeekFrom::Start(52)).unwrap();
    let err = file.seek(SeekFrom::Start(3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}

#[test]
fn test_seek_from_end_with_unknown_size() {
    let mut file = handle_response(URL, StatusCode::OK, &headers(&[]), MemoryBody::new("abc")).unwrap();
    let err = file.seek(SeekFrom::End(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}

#[test]
fn test_seek_past_single_range() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 10-19/100")]),
        MemoryBody::new("0123456789"),
    )
    .unwrap();

    let err = file.seek(SeekFrom::Start(30)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}

#[test]
fn test_multipart_leading_crlfs_and_quoted_boundary() {
    let body = "\r\n\r\n--<X-BOUNDARY>\r\nContent-Range: bytes 0-2/10\r\n\r\nabc\r\n--X-BOUNDARY--\r\n";
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();
    assert_eq!(&file.read(3).unwrap()[..], b"abc");
}

#[test]
fn test_multipart_bad_boundary() {
    let body = "--OTHER\r\nContent-Range: bytes 0-2/10\r\n\r\nabc\r\n";
    let err = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHttpResponse);
}

#[test]
fn test_multipart_part_without_content_range() {
    let body = "--X-BOUNDARY\r\nContent-Type: text/plain\r\n\r\nabc\r\n";
    let err = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHttpResponse);
}

#[test]
fn test_multipart_truncated_part() {
    let body = "--X-BOUNDARY\r\nContent-Range: bytes 0-9/10\r\n\r\nabc";
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();
    let err = file.read(10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShortRead);
}

#[test]
fn test_io_read_concatenates_ranges() {
    let body = multipart_body(&[("bytes 0-4/100", "01234"), ("bytes 50-54/100", "56789")]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), MemoryBody::new(body)).unwrap();

    let mut buf = [0u8; 3];
    assert_eq!(Read::read(&mut file, &mut buf).unwrap(), 3);
    assert_eq!(&buf, b"012");
    // Clamped to the end of the current range.
    assert_eq!(Read::read(&mut file, &mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], b"34");
    assert_eq!(Read::read(&mut file, &mut buf).unwrap(), 3);
    assert_eq!(&buf, b"567");
    assert_eq!(Seek::stream_position(&mut file).unwrap(), 53);
}

#[test]
fn test_io_read_to_end_multipart() {
    let body = multipart_body(&[
        ("bytes 0-4/100", "01234"),
        ("bytes 20-22/100", "abc"),
        ("bytes 90-99/100", "ABCDEFGHIJ"),
    ]);
    let mut file = handle_response(URL, StatusCode::PARTIAL_CONTENT, &multipart_headers(), trickle(&body)).unwrap();

    let mut data = Vec::new();
    io::copy(&mut file, &mut data).unwrap();
    assert_eq!(data, b"01234abcABCDEFGHIJ");
    assert_eq!(file.tell(), 100);
}

#[test]
fn test_io_read_to_end_single_range() {
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &headers(&[("Content-Range", "bytes 10-19/100")]),
        MemoryBody::new("0123456789 trailing bytes"),
    )
    .unwrap();

    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    assert_eq!(data, b"0123456789");
}

#[test]
fn test_io_seek_backward_error() {
    let mut file = handle_response(URL, StatusCode::OK, &headers(&[]), MemoryBody::new("abcdef")).unwrap();
    Seek::seek(&mut file, SeekFrom::Start(4)).unwrap();
    let err = Seek::seek(&mut file, SeekFrom::Start(1)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

// Keeps the size of every read asked from the body.
struct Recording {
    inner: MemoryBody,
    requests: Vec<usize>,
}

impl BodyStream for Recording {
    fn read(&mut self, max: usize) -> io::Result<Bytes> {
        self.requests.push(max);
        self.inner.read(max)
    }

    fn read_line(&mut self) -> io::Result<Bytes> {
        self.inner.read_line()
    }
}

#[test]
fn test_small_read_ceiling_and_discard_chunk() {
    let data: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let mut body = Recording {
        inner: MemoryBody::new(data.clone()),
        requests: Vec::new(),
    };
    let limit = SizeLimit::new().max_read_size(7).discard_chunk(3);
    let mut file = byterange::handle_response_with_size_limit(
        URL,
        StatusCode::OK,
        &headers(&[("Content-Length", "5000")]),
        &mut body,
        limit,
    )
    .unwrap();

    file.seek(SeekFrom::Start(1001)).unwrap();
    let read = file.read(1000).unwrap();
    assert_eq!(&read[..], data[1001..2001].as_bytes());
    assert_eq!(file.tell(), 2001);
    drop(file);

    // 1001 skipped bytes in chunks of 3, then 1000 read bytes in calls of 7.
    let (discards, reads) = body.requests.split_at(334);
    assert_eq!(discards.iter().max(), Some(&3));
    assert_eq!(discards.iter().sum::<usize>(), 1001);
    assert_eq!(reads.iter().max(), Some(&7));
    assert_eq!(reads.iter().sum::<usize>(), 1000);
}

#[test]
fn test_empty_whole_file() {
    let mut file = handle_response(
        URL,
        StatusCode::OK,
        &headers(&[("Content-Length", "0")]),
        MemoryBody::new(""),
    )
    .unwrap();

    assert_eq!(file.range(), (0, Some(0)));
    assert_eq!(file.state(), ReaderState::Exhausted);
    assert!(file.read_to_end_of_range().unwrap().is_empty());
    assert!(file.read(1).unwrap().is_empty());
    assert_eq!(file.tell(), 0);

    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    assert!(data.is_empty());
}

#[test]
fn test_borrowed_body_is_left_after_range() {
    let mut body = MemoryBody::new("0123456789rest");
    {
        let mut file = RangeFile::new(URL, &mut body);
        file.set_range_from_header("bytes 0-9/10").unwrap();
        assert_eq!(&file.read(10).unwrap()[..], b"0123456789");
    }
    assert_eq!(&body.read(100).unwrap()[..], b"rest");
}

#[test]
fn test_over_tcp_socket() {
    let payload = multipart_body(&[
        ("bytes 0-4/100000", "hello"),
        ("bytes 90000-90004/100000", "world"),
    ]);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        for chunk in payload.as_bytes().chunks(7) {
            socket.write_all(chunk).unwrap();
            socket.flush().unwrap();
        }
    });

    let socket = TcpStream::connect(addr).unwrap();
    let mut file = handle_response(
        URL,
        StatusCode::PARTIAL_CONTENT,
        &multipart_headers(),
        StreamBuffer::new(socket),
    )
    .unwrap();

    assert_eq!(&file.read(5).unwrap()[..], b"hello");
    file.seek(SeekFrom::Start(90002)).unwrap();
    assert_eq!(&file.read(3).unwrap()[..], b"rld");
    assert_eq!(file.tell(), 90005);

    server.join().unwrap();
}
