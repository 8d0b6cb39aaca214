fn main() -> std::process::ExitCode {
    what_text_lib::run()
}
