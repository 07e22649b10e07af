//fixed-capacity ring, every slot always holds a value (T::default() until written)
//writes overwrite the oldest slot, there is no pop
pub struct RingBuffer<T>{
    buffer: Vec<T>,
    cursor: usize,     //slot of the most recent write
    write_epoch: u64,  //number of pushes so far
}

impl<T: Copy + Default> RingBuffer<T>{
    //creating a new ring with all slots defaulted
    pub fn new(capacity: usize) -> Self{
        assert!(capacity > 0, "ring capacity must be greater than 0");

        RingBuffer{
            buffer: vec![T::default(); capacity],
            cursor: 0,
            write_epoch: 0,
        }
    }

    //write into the slot after the cursor and move the cursor there
    //return the epoch num. of the push
    pub fn push(&mut self, item: T) -> u64{
        let next = (self.cursor + 1) % self.buffer.len();
        self.buffer[next] = item;
        self.cursor = next;

        self.write_epoch += 1;
        self.write_epoch
    }

    //value at the cursor (default before the first push)
    pub fn latest(&self) -> T{
        self.buffer[self.cursor]
    }

    pub fn cursor(&self) -> usize{
        self.cursor
    }

    pub fn latest_epoch(&self) -> u64{
        self.write_epoch
    }

    //all slots in storage order, including never-written ones
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_{
        self.buffer.iter()
    }

    //number of slots holding a pushed value
    pub fn len(&self) -> usize{
        (self.write_epoch.min(self.buffer.len() as u64)) as usize
    }

    pub fn is_empty(&self) -> bool{
        self.write_epoch == 0
    }

    pub fn capacity(&self) -> usize{
        self.buffer.len()
    }

    //back to the freshly constructed state
    pub fn clear(&mut self){
        for slot in self.buffer.iter_mut(){
            *slot = T::default();
        }
        self.cursor = 0;
        self.write_epoch = 0;
    }
}

impl RingBuffer<f32>{
    //plain sum over every slot
    pub fn sum(&self) -> f32{
        self.buffer.iter().sum()
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_starts_zeroed(){
        let rb: RingBuffer<f32> = RingBuffer::new(20);
        assert_eq!(rb.capacity(), 20);
        assert!(rb.is_empty());
        assert_eq!(rb.sum(), 0.0);
        assert!(rb.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_first_push_lands_after_cursor(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(4);
        rb.push(7);
        assert_eq!(rb.cursor(), 1);
        assert_eq!(rb.latest(), 7);
    }

    #[test]
    fn test_wraparound_overwrites_oldest(){
        let mut rb: RingBuffer<i32> = RingBuffer::new(3);

        rb.push(1);
        rb.push(2);
        rb.push(3);  //slots [3, 1, 2]
        rb.push(4);  //overwrites 1 -> [3, 4, 2]

        let mut vals: Vec<i32> = rb.iter().copied().collect();
        vals.sort();
        assert_eq!(vals, vec![2, 3, 4]);
        assert_eq!(rb.latest(), 4);
        assert_eq!(rb.len(), 3);
    }

    #[test]
    fn test_epoch_increment(){
        let mut rb: RingBuffer<f32> = RingBuffer::new(5);

        let e1 = rb.push(1.0);
        let e2 = rb.push(2.0);

        assert_eq!(e1, 1);
        assert_eq!(e2, 2);
        assert_eq!(rb.latest_epoch(), 2);
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_sum_tracks_most_recent_window(){
        let mut rb: RingBuffer<f32> = RingBuffer::new(20);

        for n in 1..=35{
            rb.push(n as f32);
            let lo = if n > 20 { n - 19 } else { 1 };
            let expected: f32 = (lo..=n).map(|k| k as f32).sum();
            assert_eq!(rb.sum(), expected, "after {} pushes", n);
        }
    }

    #[test]
    fn test_clear(){
        let mut rb: RingBuffer<f32> = RingBuffer::new(3);
        rb.push(1.0);
        rb.push(2.0);
        rb.clear();

        assert!(rb.is_empty());
        assert_eq!(rb.sum(), 0.0);
        assert_eq!(rb.cursor(), 0);
    }
}
