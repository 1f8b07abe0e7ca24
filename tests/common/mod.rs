#![allow(dead_code)]

pub mod log_capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// In-memory sink for [`jsonservice::logging::Logger::with_writer`].
    #[derive(Clone, Default)]
    pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        pub fn lines(&self) -> Vec<String> {
            self.contents().lines().map(str::to_string).collect()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

pub mod fixtures {
    use jsonservice::dispatcher::Reply;
    use jsonservice::route::{Operation, ParamType, Parameter, RouteBinding};

    pub fn add() -> Operation {
        Operation::new("Add", |call| {
            Reply::json(&(call.args().i32("a")? + call.args().i32("b")?))
        })
        .param(Parameter::required("a", ParamType::Int32))
        .param(Parameter::required("b", ParamType::Int32))
        .bind(
            RouteBinding::get("add?value1={a}&value2={b}")
                .description("Adds two integers")
                .example("add?value1=3&value2=5"),
        )
    }

    pub fn status() -> Operation {
        Operation::new("Status", |_| Reply::json("OK"))
            .bind(RouteBinding::get("/").allow_unauthorized())
    }

    pub fn save() -> Operation {
        Operation::new("Save", |call| {
            let doc = call.args().document("doc")?;
            Ok(Reply::value(doc.clone()))
        })
        .param(Parameter::required("id", ParamType::Int64))
        .param(Parameter::required("doc", ParamType::Document))
        .bind(RouteBinding::post("save?id={id}").entity("doc"))
    }
}

pub mod test_server {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::sync::Once;
    use std::time::Duration;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// A port nothing is listening on right now.
    pub fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    pub fn send_request(addr: SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn get(addr: SocketAddr, target: &str) -> String {
        send_request(
            addr,
            &format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
        )
    }

    pub fn post(addr: SocketAddr, target: &str, body: &str) -> String {
        send_request(
            addr,
            &format!(
                "POST {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            ),
        )
    }

    /// Status code, header lines and body of a raw HTTP response.
    pub fn parse_response(resp: &str) -> (u16, Vec<String>, String) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let head = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("").to_string();
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        (status, lines.map(str::to_string).collect(), body)
    }
}
